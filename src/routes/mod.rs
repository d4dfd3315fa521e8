mod admin_tasks;
mod auth;
mod events;
mod files;
mod registrations;
mod tasks;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::storage::Storage;

async fn health() -> &'static str {
    "OK"
}

/// Every route, with the database and upload storage injected as extensions.
pub fn build_router(
    db: Arc<dyn Database>,
    storage: Arc<dyn Storage>,
    max_upload_bytes: usize,
) -> Router {
    Router::new()
        .route("/", get(health))
        // Users
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/user/{id}", get(auth::get_user).put(auth::update_user))
        // Events
        .route(
            "/admin/add_event",
            post(events::add_event).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/events", get(events::list_events))
        .route("/pre_register", post(registrations::pre_register))
        // User tasks
        .route("/assign_task", post(tasks::assign_task))
        .route("/my_tasks/{email}", get(tasks::my_tasks))
        // Admin tasks
        .route(
            "/admin/tasks",
            post(admin_tasks::create_admin_task).get(admin_tasks::list_admin_tasks),
        )
        .route(
            "/admin/tasks/{id}",
            put(admin_tasks::update_admin_task).delete(admin_tasks::delete_admin_task),
        )
        // Uploads
        .route("/uploads/{name}", get(files::get_upload))
        .layer(Extension(db))
        .layer(Extension(storage))
        .layer(TraceLayer::new_for_http())
}
