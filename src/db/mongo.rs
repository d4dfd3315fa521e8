use super::*;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, IndexModel,
    bson::{self, Document, doc},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};

const DUPLICATE_KEY: i32 = 11000;

const USERS: &str = "users";
const EVENTS: &str = "events";
const PRE_REGISTRATIONS: &str = "preregistrations";
const TASKS: &str = "tasks";
const ADMIN_TASKS: &str = "admintasks";

fn map_err(err: MongoError) -> DbError {
    let duplicate = match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(ref e) => e.code == DUPLICATE_KEY,
        _ => false,
    };
    if duplicate {
        DbError::Duplicate
    } else {
        DbError::Backend(err.to_string())
    }
}

fn to_bson(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

fn from_bson(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

// ── Documents ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    email: String,
    password: String,
}

impl From<&User> for UserDocument {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            password: u.password_hash.clone(),
        }
    }
}

impl From<UserDocument> for User {
    fn from(d: UserDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            password_hash: d.password,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    date: bson::DateTime,
    location: String,
    description: String,
    image: Option<String>,
    created_at: bson::DateTime,
}

impl From<&Event> for EventDocument {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            date: to_bson(e.date),
            location: e.location.clone(),
            description: e.description.clone(),
            image: e.image_url.clone(),
            created_at: to_bson(e.created_at),
        }
    }
}

impl From<EventDocument> for Event {
    fn from(d: EventDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            date: from_bson(d.date),
            location: d.location,
            description: d.description,
            image_url: d.image,
            created_at: from_bson(d.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreRegistrationDocument {
    #[serde(rename = "_id")]
    id: String,
    fullname: String,
    dob: bson::DateTime,
    email: String,
    phone: String,
    event: String,
    created_at: bson::DateTime,
}

impl From<&PreRegistration> for PreRegistrationDocument {
    fn from(r: &PreRegistration) -> Self {
        Self {
            id: r.id.clone(),
            fullname: r.fullname.clone(),
            dob: to_bson(r.dob),
            email: r.email.clone(),
            phone: r.phone.clone(),
            event: r.event.clone(),
            created_at: to_bson(r.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDocument {
    #[serde(rename = "_id")]
    id: String,
    email: String,
    task_name: String,
    created_at: bson::DateTime,
}

impl From<&Task> for TaskDocument {
    fn from(t: &Task) -> Self {
        Self {
            id: t.id.clone(),
            email: t.email.clone(),
            task_name: t.task_name.clone(),
            created_at: to_bson(t.created_at),
        }
    }
}

impl From<TaskDocument> for Task {
    fn from(d: TaskDocument) -> Self {
        Self {
            id: d.id,
            email: d.email,
            task_name: d.task_name,
            created_at: from_bson(d.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminTaskDocument {
    #[serde(rename = "_id")]
    id: String,
    task_name: String,
    description: Option<String>,
    deadline: Option<bson::DateTime>,
    created_at: bson::DateTime,
}

impl From<&AdminTask> for AdminTaskDocument {
    fn from(t: &AdminTask) -> Self {
        Self {
            id: t.id.clone(),
            task_name: t.task_name.clone(),
            description: t.description.clone(),
            deadline: t.deadline.map(to_bson),
            created_at: to_bson(t.created_at),
        }
    }
}

impl From<AdminTaskDocument> for AdminTask {
    fn from(d: AdminTaskDocument) -> Self {
        Self {
            id: d.id,
            task_name: d.task_name,
            description: d.description,
            deadline: d.deadline.map(from_bson),
            created_at: from_bson(d.created_at),
        }
    }
}

fn user_set(update: UserUpdate) -> Document {
    let mut set = Document::new();
    if let Some(name) = update.name {
        set.insert("name", name);
    }
    if let Some(email) = update.email {
        set.insert("email", email);
    }
    if let Some(hash) = update.password_hash {
        set.insert("password", hash);
    }
    set
}

fn admin_task_set(patch: AdminTaskPatch) -> Document {
    let mut set = Document::new();
    if let Some(task_name) = patch.task_name {
        set.insert("taskName", task_name);
    }
    if let Some(description) = patch.description {
        set.insert("description", description);
    }
    if let Some(deadline) = patch.deadline {
        set.insert("deadline", to_bson(deadline));
    }
    set
}

// ── Store ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MongoDatabase {
    users: Collection<UserDocument>,
    events: Collection<EventDocument>,
    pre_registrations: Collection<PreRegistrationDocument>,
    tasks: Collection<TaskDocument>,
    admin_tasks: Collection<AdminTaskDocument>,
}

impl MongoDatabase {
    /// Connects, pings the server and makes sure the uniqueness indexes exist.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, DbError> {
        let client = Client::with_uri_str(uri).await.map_err(map_err)?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await.map_err(map_err)?;

        let store = Self {
            users: db.collection(USERS),
            events: db.collection(EVENTS),
            pre_registrations: db.collection(PRE_REGISTRATIONS),
            tasks: db.collection(TASKS),
            admin_tasks: db.collection(ADMIN_TASKS),
        };
        store.ensure_indexes().await?;

        tracing::info!(database, "connected to MongoDB");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), DbError> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(map_err)?;
        self.events
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "name": 1, "date": 1, "location": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(map_err)?;
        self.pre_registrations
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1, "event": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(map_err)?;
        self.tasks
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1, "createdAt": -1 })
                    .build(),
            )
            .await
            .map_err(map_err)?;
        Ok(())
    }
}

#[async_trait]
impl Database for MongoDatabase {
    async fn insert_user(&self, user: &User) -> Result<(), DbError> {
        self.users
            .insert_one(UserDocument::from(user))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, DbError> {
        let doc = self
            .users
            .find_one(doc! { "_id": id })
            .await
            .map_err(map_err)?;
        Ok(doc.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let doc = self
            .users
            .find_one(doc! { "email": email })
            .await
            .map_err(map_err)?;
        Ok(doc.map(User::from))
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<Option<User>, DbError> {
        let set = user_set(update);
        if set.is_empty() {
            return self.find_user_by_id(id).await;
        }
        let doc = self
            .users
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_err)?;
        Ok(doc.map(User::from))
    }

    async fn insert_event(&self, event: &Event) -> Result<(), DbError> {
        self.events
            .insert_one(EventDocument::from(event))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>, DbError> {
        let docs: Vec<EventDocument> = self
            .events
            .find(doc! {})
            .sort(doc! { "date": 1, "createdAt": 1 })
            .await
            .map_err(map_err)?
            .try_collect()
            .await
            .map_err(map_err)?;
        Ok(docs.into_iter().map(Event::from).collect())
    }

    async fn insert_pre_registration(
        &self,
        registration: &PreRegistration,
    ) -> Result<(), DbError> {
        self.pre_registrations
            .insert_one(PreRegistrationDocument::from(registration))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn insert_task(&self, task: &Task) -> Result<(), DbError> {
        self.tasks
            .insert_one(TaskDocument::from(task))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn list_tasks_by_email(&self, email: &str) -> Result<Vec<Task>, DbError> {
        let docs: Vec<TaskDocument> = self
            .tasks
            .find(doc! { "email": email })
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(map_err)?
            .try_collect()
            .await
            .map_err(map_err)?;
        Ok(docs.into_iter().map(Task::from).collect())
    }

    async fn insert_admin_task(&self, task: &AdminTask) -> Result<(), DbError> {
        self.admin_tasks
            .insert_one(AdminTaskDocument::from(task))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn list_admin_tasks(&self) -> Result<Vec<AdminTask>, DbError> {
        let docs: Vec<AdminTaskDocument> = self
            .admin_tasks
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(map_err)?
            .try_collect()
            .await
            .map_err(map_err)?;
        Ok(docs.into_iter().map(AdminTask::from).collect())
    }

    async fn update_admin_task(
        &self,
        id: &str,
        patch: AdminTaskPatch,
    ) -> Result<Option<AdminTask>, DbError> {
        let set = admin_task_set(patch);
        let doc = if set.is_empty() {
            self.admin_tasks.find_one(doc! { "_id": id }).await
        } else {
            self.admin_tasks
                .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
                .return_document(ReturnDocument::After)
                .await
        }
        .map_err(map_err)?;
        Ok(doc.map(AdminTask::from))
    }

    async fn delete_admin_task(&self, id: &str) -> Result<bool, DbError> {
        let result = self
            .admin_tasks
            .delete_one(doc! { "_id": id })
            .await
            .map_err(map_err)?;
        Ok(result.deleted_count == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_date;

    #[test]
    fn empty_user_update_sets_nothing() {
        assert!(user_set(UserUpdate::default()).is_empty());
    }

    #[test]
    fn user_update_stores_hash_under_password_key() {
        let set = user_set(UserUpdate {
            password_hash: Some("$2b$10$xyz".into()),
            ..Default::default()
        });
        assert_eq!(set.get_str("password").unwrap(), "$2b$10$xyz");
        assert!(!set.contains_key("name"));
    }

    #[test]
    fn admin_task_patch_uses_camel_case_keys() {
        let set = admin_task_set(AdminTaskPatch {
            task_name: Some("Order chairs".into()),
            deadline: parse_date("2025-02-01"),
            ..Default::default()
        });
        assert_eq!(set.get_str("taskName").unwrap(), "Order chairs");
        assert!(set.get_datetime("deadline").is_ok());
        assert!(!set.contains_key("description"));
    }

    #[test]
    fn bson_dates_keep_millisecond_precision() {
        let date = parse_date("2025-02-01T10:30:15.250Z").unwrap();
        assert_eq!(from_bson(to_bson(date)), date);
    }
}
