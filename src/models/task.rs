use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskPriority {
    #[serde(alias = "low")]
    Low,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
}

/// Input structure for creating or fully updating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: Option<String>,

    /// Optional due date. Clients send an empty string when the field is cleared.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub completed: bool,

    /// Defaults to `MEDIUM` when omitted.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

/// Body of `PATCH /api/tasks/{id}/status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskStatusUpdate {
    pub completed: bool,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    /// Set iff `completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    /// Identifier of the user who owns the task. Fixed at creation.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` from `TaskInput` for the given owner.
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            completed: input.completed,
            completed_at: completion_timestamp(None, input.completed, now),
            priority: input.priority.unwrap_or_default(),
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every user-editable field. Owner and creation time are untouched.
    pub fn apply_update(&mut self, input: TaskInput, now: DateTime<Utc>) {
        self.title = input.title;
        self.description = input.description;
        self.due_date = input.due_date;
        self.priority = input.priority.unwrap_or_default();
        self.set_completed(input.completed, now);
    }

    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed_at = completion_timestamp(self.completed_at, completed, now);
        self.completed = completed;
        self.updated_at = now;
    }
}

/// Completion timestamp after the flag is set to `completed`.
///
/// A task that becomes complete is stamped with `now`; one that already was keeps its
/// original stamp; an incomplete task has none.
pub fn completion_timestamp(
    previous: Option<DateTime<Utc>>,
    completed: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if completed {
        Some(previous.unwrap_or(now))
    } else {
        None
    }
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let raw = match raw.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(value) => value,
    };

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid due date: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: None,
            due_date: None,
            completed: false,
            priority: None,
        }
    }

    #[test]
    fn test_task_creation() {
        let task = Task::new(input("Test Task"), 1);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.user_id, 1);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_task_created_completed_is_stamped() {
        let mut done = input("Already done");
        done.completed = true;
        let task = Task::new(done, 1);
        assert!(task.completed);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_completion_toggles_keep_invariant() {
        let mut task = Task::new(input("Toggle me"), 3);
        let start = Utc::now();

        for step in 0..10 {
            let now = start + Duration::seconds(step);
            let completed = step % 3 != 0;
            task.set_completed(completed, now);
            assert_eq!(task.completed, completed);
            assert_eq!(task.completed_at.is_some(), completed);
        }
    }

    #[test]
    fn test_completion_timestamp_transitions() {
        let earlier = Utc::now() - Duration::hours(1);
        let now = Utc::now();

        assert_eq!(completion_timestamp(None, true, now), Some(now));
        assert_eq!(completion_timestamp(Some(earlier), true, now), Some(earlier));
        assert_eq!(completion_timestamp(Some(earlier), false, now), None);
        assert_eq!(completion_timestamp(None, false, now), None);
    }

    #[test]
    fn test_apply_update_keeps_owner() {
        let mut task = Task::new(input("Original"), 9);
        let id = task.id;
        let created_at = task.created_at;

        let mut update = input("Renamed");
        update.priority = Some(TaskPriority::High);
        update.completed = true;
        task.apply_update(update, Utc::now());

        assert_eq!(task.id, id);
        assert_eq!(task.user_id, 9);
        assert_eq!(task.created_at, created_at);
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.priority, TaskPriority::High);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_task_input_from_client_json() {
        let parsed: TaskInput = serde_json::from_str(r#"{"title":"t1"}"#).unwrap();
        assert_eq!(parsed.title, "t1");
        assert!(!parsed.completed);
        assert!(parsed.due_date.is_none());
        assert!(parsed.priority.is_none());

        let parsed: TaskInput = serde_json::from_str(
            r#"{"title":"t2","description":"d","priority":"HIGH","dueDate":"2025-03-14","completed":false}"#,
        )
        .unwrap();
        assert_eq!(parsed.priority, Some(TaskPriority::High));
        assert_eq!(parsed.due_date, NaiveDate::from_ymd_opt(2025, 3, 14));

        let parsed: TaskInput =
            serde_json::from_str(r#"{"title":"t3","dueDate":"","priority":"low"}"#).unwrap();
        assert!(parsed.due_date.is_none());
        assert_eq!(parsed.priority, Some(TaskPriority::Low));

        assert!(serde_json::from_str::<TaskInput>(r#"{"title":"t4","dueDate":"soon"}"#).is_err());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task::new(input("t1"), 1);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["completed"], false);
        assert!(json["completedAt"].is_null());
        assert_eq!(json["priority"], "MEDIUM");
        assert_eq!(json["userId"], 1);
    }

    #[test]
    fn test_task_validation() {
        assert!(input("Valid Task").validate().is_ok());
        assert!(input("").validate().is_err());
        assert!(input(&"a".repeat(201)).validate().is_err());

        let mut long_description = input("Valid title");
        long_description.description = Some("b".repeat(1001));
        assert!(long_description.validate().is_err());
    }
}
