use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::db::{Database, DbError};
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::models::{
    LoginRequest, SignupRequest, UpdateUserRequest, User, UserUpdate, UserView, new_id, present,
};
use crate::password;

// ── POST /signup ────────────────────────────────────────────────────────────

pub async fn signup(
    Extension(db): Extension<Arc<dyn Database>>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        present(body.name),
        present(body.email),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Name, email and password are required"));
    };

    if db.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let user = User {
        id: new_id(),
        name,
        email,
        password_hash: password::hash(&password).await?,
    };
    match db.insert_user(&user).await {
        Ok(()) => {}
        Err(DbError::Duplicate) => return Err(ApiError::conflict("User already exists")),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

// ── POST /login ─────────────────────────────────────────────────────────────

pub async fn login(
    Extension(db): Extension<Arc<dyn Database>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let invalid = || ApiError::bad_request("Invalid email or password");

    let (Some(email), Some(password)) = (present(body.email), body.password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let user = db.find_user_by_email(&email).await?.ok_or_else(invalid)?;
    if !password::verify(&password, &user.password_hash).await? {
        tracing::debug!(user_id = %user.id, "login rejected");
        return Err(invalid());
    }

    Ok(Json(json!({
        "message": "Login successful",
        "user": UserView::from(user),
    })))
}

// ── GET /user/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    Path(id): Path<String>,
    Extension(db): Extension<Arc<dyn Database>>,
) -> Result<Json<Value>, ApiError> {
    let user = db
        .find_user_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "message": "User fetched successfully",
        "user": UserView::from(user),
    })))
}

// ── PUT /user/{id} ──────────────────────────────────────────────────────────

pub async fn update_user(
    Path(id): Path<String>,
    Extension(db): Extension<Arc<dyn Database>>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let password_hash = match body.new_password() {
        Some(p) => Some(password::hash(p).await?),
        None => None,
    };
    let update = UserUpdate {
        name: present(body.name),
        email: present(body.email),
        password_hash,
    };

    let user = match db.update_user(&id, update).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::not_found("User not found")),
        Err(DbError::Duplicate) => return Err(ApiError::conflict("Email already in use")),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "user updated");
    Ok(Json(json!({
        "message": "User updated successfully",
        "user": UserView::from(user),
    })))
}
