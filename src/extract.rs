use axum::extract::FromRequest;

use crate::errors::ApiError;

/// `axum::Json`, but malformed or non-JSON bodies become a 400 `ApiError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
