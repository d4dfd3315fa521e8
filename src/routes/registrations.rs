use axum::{Json, extract::Extension, http::StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::db::{Database, DbError};
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::models::{PreRegisterRequest, PreRegistration};

/// `event` is free text; it is not checked against stored events.
pub async fn pre_register(
    Extension(db): Extension<Arc<dyn Database>>,
    ApiJson(body): ApiJson<PreRegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let registration = PreRegistration::try_from(body)?;

    match db.insert_pre_registration(&registration).await {
        Ok(()) => {}
        Err(DbError::Duplicate) => {
            return Err(ApiError::conflict(
                "You have already pre-registered for this event",
            ));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(registration_id = %registration.id, event = %registration.event, "pre-registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Pre-registration successful",
            "registration": registration,
        })),
    ))
}
