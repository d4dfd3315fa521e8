mod in_memory;
mod mongo;

pub use in_memory::InMemoryDatabase;
pub use mongo::MongoDatabase;

use crate::models::{
    AdminTask, AdminTaskPatch, Event, PreRegistration, Task, User, UserUpdate,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// A uniqueness constraint of the target collection was violated.
    #[error("duplicate record")]
    Duplicate,
    #[error("{0}")]
    Backend(String),
}

/// Document store holding the five collections the API works with.
///
/// Uniqueness is enforced here, atomically with the write:
/// user `email`, event `(name, date, location)` and pre-registration
/// `(email, event)` all fail with [`DbError::Duplicate`].
#[async_trait]
pub trait Database: Send + Sync + 'static {
    async fn insert_user(&self, user: &User) -> Result<(), DbError>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, DbError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
    /// Returns the updated user, or `None` when `id` is unknown.
    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<Option<User>, DbError>;

    async fn insert_event(&self, event: &Event) -> Result<(), DbError>;
    /// All events, ordered by date ascending.
    async fn list_events(&self) -> Result<Vec<Event>, DbError>;

    async fn insert_pre_registration(&self, registration: &PreRegistration)
    -> Result<(), DbError>;

    async fn insert_task(&self, task: &Task) -> Result<(), DbError>;
    /// Tasks for `email`, newest first.
    async fn list_tasks_by_email(&self, email: &str) -> Result<Vec<Task>, DbError>;

    async fn insert_admin_task(&self, task: &AdminTask) -> Result<(), DbError>;
    /// All admin tasks, newest first.
    async fn list_admin_tasks(&self) -> Result<Vec<AdminTask>, DbError>;
    /// Returns the updated task, or `None` when `id` is unknown.
    async fn update_admin_task(
        &self,
        id: &str,
        patch: AdminTaskPatch,
    ) -> Result<Option<AdminTask>, DbError>;
    /// Returns `false` when `id` is unknown.
    async fn delete_admin_task(&self, id: &str) -> Result<bool, DbError>;
}
