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
use crate::models::{AdminTask, AdminTaskRequest};

fn task_not_found() -> ApiError {
    ApiError::not_found("Task not found")
}

pub async fn create_admin_task(
    Extension(db): Extension<Arc<dyn Database>>,
    ApiJson(body): ApiJson<AdminTaskRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let task = body.into_task()?;
    db.insert_admin_task(&task).await?;

    tracing::info!(task_id = %task.id, "admin task created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Task created successfully", "task": task })),
    ))
}

pub async fn list_admin_tasks(
    Extension(db): Extension<Arc<dyn Database>>,
) -> Result<Json<Vec<AdminTask>>, ApiError> {
    Ok(Json(db.list_admin_tasks().await?))
}

pub async fn update_admin_task(
    Path(id): Path<String>,
    Extension(db): Extension<Arc<dyn Database>>,
    ApiJson(body): ApiJson<AdminTaskRequest>,
) -> Result<Json<Value>, ApiError> {
    let patch = body.into_patch()?;
    let task = db
        .update_admin_task(&id, patch)
        .await?
        .ok_or_else(task_not_found)?;

    tracing::info!(task_id = %task.id, "admin task updated");
    Ok(Json(
        json!({ "message": "Task updated successfully", "task": task }),
    ))
}

pub async fn delete_admin_task(
    Path(id): Path<String>,
    Extension(db): Extension<Arc<dyn Database>>,
) -> Result<Json<Value>, ApiError> {
    if !db.delete_admin_task(&id).await? {
        return Err(task_not_found());
    }

    tracing::info!(task_id = %id, "admin task deleted");
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}
