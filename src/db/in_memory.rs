use super::*;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    events: Vec<Event>,
    pre_registrations: Vec<PreRegistration>,
    tasks: Vec<Task>,
    admin_tasks: Vec<AdminTask>,
}

/// Process-local store; every check-and-write happens under one write lock.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    inner: Arc<RwLock<Collections>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn insert_user(&self, user: &User) -> Result<(), DbError> {
        let mut db = self.inner.write().await;
        if db.users.iter().any(|u| u.email == user.email) {
            return Err(DbError::Duplicate);
        }
        db.users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, DbError> {
        Ok(self.inner.read().await.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<Option<User>, DbError> {
        let mut db = self.inner.write().await;
        if let Some(ref email) = update.email {
            if db.users.iter().any(|u| u.email == *email && u.id != id) {
                return Err(DbError::Duplicate);
            }
        }
        let Some(user) = db.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        Ok(Some(user.clone()))
    }

    async fn insert_event(&self, event: &Event) -> Result<(), DbError> {
        let mut db = self.inner.write().await;
        let exists = db.events.iter().any(|e| {
            e.name == event.name && e.date == event.date && e.location == event.location
        });
        if exists {
            return Err(DbError::Duplicate);
        }
        db.events.push(event.clone());
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>, DbError> {
        let mut events = self.inner.read().await.events.clone();
        events.sort_by_key(|e| (e.date, e.created_at));
        Ok(events)
    }

    async fn insert_pre_registration(
        &self,
        registration: &PreRegistration,
    ) -> Result<(), DbError> {
        let mut db = self.inner.write().await;
        let exists = db
            .pre_registrations
            .iter()
            .any(|r| r.email == registration.email && r.event == registration.event);
        if exists {
            return Err(DbError::Duplicate);
        }
        db.pre_registrations.push(registration.clone());
        Ok(())
    }

    async fn insert_task(&self, task: &Task) -> Result<(), DbError> {
        self.inner.write().await.tasks.push(task.clone());
        Ok(())
    }

    async fn list_tasks_by_email(&self, email: &str) -> Result<Vec<Task>, DbError> {
        let mut tasks: Vec<Task> = self
            .inner
            .read()
            .await
            .tasks
            .iter()
            .rev()
            .filter(|t| t.email == email)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn insert_admin_task(&self, task: &AdminTask) -> Result<(), DbError> {
        self.inner.write().await.admin_tasks.push(task.clone());
        Ok(())
    }

    async fn list_admin_tasks(&self) -> Result<Vec<AdminTask>, DbError> {
        let mut tasks: Vec<AdminTask> =
            self.inner.read().await.admin_tasks.iter().rev().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update_admin_task(
        &self,
        id: &str,
        patch: AdminTaskPatch,
    ) -> Result<Option<AdminTask>, DbError> {
        let mut db = self.inner.write().await;
        Ok(db.admin_tasks.iter_mut().find(|t| t.id == id).map(|task| {
            patch.apply(task);
            task.clone()
        }))
    }

    async fn delete_admin_task(&self, id: &str) -> Result<bool, DbError> {
        let mut db = self.inner.write().await;
        let before = db.admin_tasks.len();
        db.admin_tasks.retain(|t| t.id != id);
        Ok(db.admin_tasks.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{new_id, parse_date};
    use chrono::{Duration, Utc};

    fn user(email: &str) -> User {
        User {
            id: new_id(),
            name: "Ada".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    fn event(name: &str, date: &str) -> Event {
        Event {
            id: new_id(),
            name: name.into(),
            date: parse_date(date).unwrap(),
            location: "Main hall".into(),
            description: "desc".into(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn rejects_second_user_with_same_email() {
        let db = InMemoryDatabase::new();
        db.insert_user(&user("a@x.com")).await.unwrap();
        assert_eq!(db.insert_user(&user("a@x.com")).await, Err(DbError::Duplicate));
    }

    #[tokio::test]
    async fn update_user_refuses_taken_email() {
        let db = InMemoryDatabase::new();
        let first = user("a@x.com");
        let second = user("b@x.com");
        db.insert_user(&first).await.unwrap();
        db.insert_user(&second).await.unwrap();

        let update = UserUpdate {
            email: Some("a@x.com".into()),
            ..Default::default()
        };
        assert_eq!(
            db.update_user(&second.id, update).await,
            Err(DbError::Duplicate)
        );

        // Re-submitting your own email is not a conflict.
        let update = UserUpdate {
            email: Some("b@x.com".into()),
            name: Some("Grace".into()),
            ..Default::default()
        };
        let updated = db.update_user(&second.id, update).await.unwrap().unwrap();
        assert_eq!(updated.name, "Grace");
    }

    #[tokio::test]
    async fn update_unknown_user_is_none() {
        let db = InMemoryDatabase::new();
        let res = db.update_user("missing", UserUpdate::default()).await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn events_are_listed_by_date_ascending() {
        let db = InMemoryDatabase::new();
        db.insert_event(&event("C", "2025-09-01")).await.unwrap();
        db.insert_event(&event("A", "2025-01-01")).await.unwrap();
        db.insert_event(&event("B", "2025-05-01")).await.unwrap();

        let names: Vec<_> = db
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn identical_event_triple_is_duplicate() {
        let db = InMemoryDatabase::new();
        db.insert_event(&event("Launch", "2025-01-01")).await.unwrap();
        assert_eq!(
            db.insert_event(&event("Launch", "2025-01-01")).await,
            Err(DbError::Duplicate)
        );
        db.insert_event(&event("Launch", "2025-01-02")).await.unwrap();
    }

    #[tokio::test]
    async fn tasks_are_filtered_and_newest_first() {
        let db = InMemoryDatabase::new();
        let now = Utc::now();
        for (i, email) in ["a@x.com", "b@x.com", "a@x.com"].into_iter().enumerate() {
            db.insert_task(&Task {
                id: new_id(),
                email: email.into(),
                task_name: format!("task {i}"),
                created_at: now + Duration::seconds(i as i64),
            })
            .await
            .unwrap();
        }

        let names: Vec<_> = db
            .list_tasks_by_email("a@x.com")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.task_name)
            .collect();
        assert_eq!(names, ["task 2", "task 0"]);
    }

    #[tokio::test]
    async fn same_instant_tasks_list_latest_insert_first() {
        let db = InMemoryDatabase::new();
        let now = Utc::now();
        for name in ["older", "newer"] {
            db.insert_task(&Task {
                id: new_id(),
                email: "a@x.com".into(),
                task_name: name.into(),
                created_at: now,
            })
            .await
            .unwrap();
            db.insert_admin_task(&AdminTask {
                id: new_id(),
                task_name: name.into(),
                description: None,
                deadline: None,
                created_at: now,
            })
            .await
            .unwrap();
        }

        let tasks = db.list_tasks_by_email("a@x.com").await.unwrap();
        let names: Vec<_> = tasks.iter().map(|t| t.task_name.as_str()).collect();
        assert_eq!(names, ["newer", "older"]);

        let admin = db.list_admin_tasks().await.unwrap();
        let names: Vec<_> = admin.iter().map(|t| t.task_name.as_str()).collect();
        assert_eq!(names, ["newer", "older"]);
    }

    #[tokio::test]
    async fn delete_admin_task_reports_misses() {
        let db = InMemoryDatabase::new();
        let task = AdminTask {
            id: new_id(),
            task_name: "Print badges".into(),
            description: None,
            deadline: None,
            created_at: Utc::now(),
        };
        db.insert_admin_task(&task).await.unwrap();

        assert!(db.delete_admin_task(&task.id).await.unwrap());
        assert!(!db.delete_admin_task(&task.id).await.unwrap());
        assert!(
            db.update_admin_task(&task.id, AdminTaskPatch::default())
                .await
                .unwrap()
                .is_none()
        );
    }
}
