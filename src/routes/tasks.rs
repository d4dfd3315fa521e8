use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::db::Database;
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::models::{AssignTaskRequest, Task};

// ── POST /assign_task ───────────────────────────────────────────────────────

pub async fn assign_task(
    Extension(db): Extension<Arc<dyn Database>>,
    ApiJson(body): ApiJson<AssignTaskRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let task = Task::try_from(body)?;
    db.insert_task(&task).await?;

    tracing::info!(task_id = %task.id, "task assigned");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Task assigned successfully", "task": task })),
    ))
}

// ── GET /my_tasks/{email} ───────────────────────────────────────────────────

pub async fn my_tasks(
    Path(email): Path<String>,
    Extension(db): Extension<Arc<dyn Database>>,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(db.list_tasks_by_email(&email).await?))
}
