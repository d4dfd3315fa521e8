use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::{HeaderValue, header},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::storage::Storage;

pub async fn get_upload(
    Path(name): Path<String>,
    Extension(storage): Extension<Arc<dyn Storage>>,
) -> Result<impl IntoResponse, ApiError> {
    let (bytes, content_type) = storage.get(&name).await?;

    let mut response = Bytes::from(bytes).into_response();

    if let Some(value) = content_type.and_then(|m| HeaderValue::from_str(m.as_ref()).ok()) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }

    Ok(response)
}
