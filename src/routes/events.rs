use axum::{
    Json,
    extract::{Extension, Multipart, multipart::MultipartRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::db::{Database, DbError};
use crate::errors::ApiError;
use crate::models::{Event, EventForm};
use crate::storage::{FileData, Storage, public_path};

const IMAGE_FIELD: &str = "image";

// ── POST /admin/add_event ───────────────────────────────────────────────────

pub async fn add_event(
    Extension(db): Extension<Arc<dyn Database>>,
    Extension(storage): Extension<Arc<dyn Storage>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut multipart = multipart?;
    let mut form = EventForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(field_name) = field.name().map(str::to_owned) else {
            continue;
        };
        match field_name.as_str() {
            IMAGE_FIELD => {
                let content_type: Option<mime::Mime> =
                    field.content_type().and_then(|m| m.parse().ok());
                let filename = field.file_name().map(|s| s.to_string());
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    image = Some(FileData {
                        bytes: bytes.to_vec(),
                        content_type,
                        filename,
                    });
                }
            }
            "name" => form.name = Some(field.text().await?),
            "date" => form.date = Some(field.text().await?),
            "location" => form.location = Some(field.text().await?),
            "description" => form.description = Some(field.text().await?),
            _ => {}
        }
    }

    // The form is validated before the image is stored.
    let mut event = form.into_event(None)?;

    let stored = match image {
        Some(file) => Some(storage.save(file).await?),
        None => None,
    };
    event.image_url = stored.as_deref().map(public_path);

    if let Err(err) = db.insert_event(&event).await {
        if let Some(name) = stored {
            if let Err(cleanup) = storage.delete(&name).await {
                tracing::warn!(%name, error = %cleanup, "failed to remove orphaned upload");
            }
        }
        return Err(match err {
            DbError::Duplicate => {
                tracing::debug!(name = %event.name, "duplicate event rejected");
                ApiError::conflict("Event already exists")
            }
            other => other.into(),
        });
    }

    tracing::info!(event_id = %event.id, "event created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Event added successfully", "event": event })),
    ))
}

// ── GET /events ─────────────────────────────────────────────────────────────

pub async fn list_events(
    Extension(db): Extension<Arc<dyn Database>>,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(db.list_events().await?))
}
