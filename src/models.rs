//! Records held in the document store, plus the request bodies and response
//! views the HTTP layer exchanges for them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// Password values that mean "leave the stored hash alone" on profile update.
pub const PASSWORD_PLACEHOLDERS: [&str; 2] = ["", "********"];

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (read as UTC midnight).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Returns the trimmed value when present and non-blank.
pub fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, missing: &str) -> Result<String, ApiError> {
    present(value).ok_or_else(|| ApiError::bad_request(missing))
}

fn required_date(value: Option<String>, field: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = required(value, "All fields are required")?;
    parse_date(&raw).ok_or_else(|| ApiError::bad_request(format!("Invalid {field} format")))
}

// ── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Fields to overwrite on a user; `None` leaves the stored value.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// A user as the API exposes it: never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// The new plain-text password, if one was actually supplied.
    pub fn new_password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .filter(|p| !PASSWORD_PLACEHOLDERS.contains(&p.trim()))
    }
}

// ── Event ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Text fields of the `add_event` multipart form, collected before validation.
#[derive(Debug, Default)]
pub struct EventForm {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventForm {
    pub fn into_event(self, image_url: Option<String>) -> Result<Event, ApiError> {
        let missing = "All fields are required";
        let name = required(self.name, missing)?;
        let location = required(self.location, missing)?;
        let description = required(self.description, missing)?;
        let date = required_date(self.date, "date")?;
        Ok(Event {
            id: new_id(),
            name,
            date,
            location,
            description,
            image_url,
            created_at: Utc::now(),
        })
    }
}

// ── PreRegistration ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreRegistration {
    pub id: String,
    pub fullname: String,
    pub dob: DateTime<Utc>,
    pub email: String,
    pub phone: String,
    pub event: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PreRegisterRequest {
    pub fullname: Option<String>,
    pub dob: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub event: Option<String>,
}

impl TryFrom<PreRegisterRequest> for PreRegistration {
    type Error = ApiError;

    fn try_from(req: PreRegisterRequest) -> Result<Self, Self::Error> {
        let missing = "All fields are required";
        Ok(Self {
            id: new_id(),
            fullname: required(req.fullname, missing)?,
            email: required(req.email, missing)?,
            phone: required(req.phone, missing)?,
            event: required(req.event, missing)?,
            dob: required_date(req.dob, "dob")?,
            created_at: Utc::now(),
        })
    }
}

// ── Task ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub email: String,
    pub task_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskRequest {
    pub email: Option<String>,
    pub task_name: Option<String>,
}

impl TryFrom<AssignTaskRequest> for Task {
    type Error = ApiError;

    fn try_from(req: AssignTaskRequest) -> Result<Self, Self::Error> {
        let missing = "Email and task name are required";
        Ok(Self {
            id: new_id(),
            email: required(req.email, missing)?,
            task_name: required(req.task_name, missing)?,
            created_at: Utc::now(),
        })
    }
}

// ── AdminTask ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTask {
    pub id: String,
    pub task_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTaskRequest {
    pub task_name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
}

/// Fields to overwrite on an admin task; `None` leaves the stored value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AdminTaskPatch {
    pub task_name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

impl AdminTaskPatch {
    pub fn is_empty(&self) -> bool {
        self.task_name.is_none() && self.description.is_none() && self.deadline.is_none()
    }

    pub fn apply(self, task: &mut AdminTask) {
        if let Some(task_name) = self.task_name {
            task.task_name = task_name;
        }
        if let Some(description) = self.description {
            task.description = Some(description);
        }
        if let Some(deadline) = self.deadline {
            task.deadline = Some(deadline);
        }
    }
}

fn optional_deadline(raw: Option<String>) -> Result<Option<DateTime<Utc>>, ApiError> {
    present(raw)
        .map(|d| parse_date(&d).ok_or_else(|| ApiError::bad_request("Invalid deadline format")))
        .transpose()
}

impl AdminTaskRequest {
    pub fn into_task(self) -> Result<AdminTask, ApiError> {
        Ok(AdminTask {
            id: new_id(),
            task_name: required(self.task_name, "Task name is required")?,
            description: present(self.description),
            deadline: optional_deadline(self.deadline)?,
            created_at: Utc::now(),
        })
    }

    pub fn into_patch(self) -> Result<AdminTaskPatch, ApiError> {
        if matches!(&self.task_name, Some(name) if name.trim().is_empty()) {
            return Err(ApiError::bad_request("Task name cannot be empty"));
        }
        Ok(AdminTaskPatch {
            task_name: present(self.task_name),
            description: present(self.description),
            deadline: optional_deadline(self.deadline)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        let parsed = parse_date("2025-03-14").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_date("2025-03-14T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_date("next tuesday").is_none());
        assert!(parse_date("2025-13-40").is_none());
    }

    #[test]
    fn event_form_requires_every_text_field() {
        let form = EventForm {
            name: Some("Launch".into()),
            date: Some("2025-01-01".into()),
            location: Some("   ".into()),
            description: Some("desc".into()),
        };
        assert!(matches!(form.into_event(None), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn event_form_rejects_unparseable_date() {
        let form = EventForm {
            name: Some("Launch".into()),
            date: Some("soon".into()),
            location: Some("Hall".into()),
            description: Some("desc".into()),
        };
        let err = form.into_event(None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid date format");
    }

    #[test]
    fn placeholder_password_is_not_a_new_password() {
        let req = UpdateUserRequest {
            name: None,
            email: None,
            password: Some("********".into()),
        };
        assert_eq!(req.new_password(), None);

        let req = UpdateUserRequest {
            name: None,
            email: None,
            password: Some("hunter2".into()),
        };
        assert_eq!(req.new_password(), Some("hunter2"));
    }

    #[test]
    fn user_view_drops_password_hash() {
        let view = UserView::from(User {
            id: "1".into(),
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "$2b$10$abc".into(),
        });
        let json = serde_json::to_value(view).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@x.com");
    }

    #[test]
    fn admin_patch_rejects_blank_task_name() {
        let req = AdminTaskRequest {
            task_name: Some(" ".into()),
            description: None,
            deadline: None,
        };
        assert!(req.into_patch().is_err());
    }

    #[test]
    fn admin_patch_applies_only_supplied_fields() {
        let mut task = AdminTaskRequest {
            task_name: Some("Book venue".into()),
            description: Some("call the hall".into()),
            deadline: None,
        }
        .into_task()
        .unwrap();

        AdminTaskPatch {
            deadline: parse_date("2025-06-01"),
            ..Default::default()
        }
        .apply(&mut task);

        assert_eq!(task.task_name, "Book venue");
        assert_eq!(task.description.as_deref(), Some("call the hall"));
        assert!(task.deadline.is_some());
    }
}
