use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a single entry in the task list.
///
/// Serialized with the field names used by the persisted blob
/// (`isCompleted`, `createdAt`, `completedAt`), timestamps as ISO 8601.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, derived from the creation timestamp.
    pub id: String,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub is_completed: bool,
    /// When the task was created. Never changes after creation.
    pub created_at: DateTime<Utc>,
    /// When the task was last marked complete, `None` while incomplete.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a fresh, incomplete task.
    pub fn new(id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Task {
        Task {
            id: id.into(),
            title: title.into(),
            is_completed: false,
            created_at: now,
            completed_at: None,
        }
    }

    /// Flips completion, stamping `completed_at` on the way to done and
    /// clearing it on the way back.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.is_completed = !self.is_completed;
        self.completed_at = if self.is_completed { Some(now) } else { None };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn toggle_sets_and_clears_completed_at() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let done = Utc.with_ymd_and_hms(2025, 1, 2, 10, 30, 0).unwrap();
        let mut task = Task::new("1", "Buy milk", created);

        task.toggle(done);
        assert!(task.is_completed);
        assert_eq!(task.completed_at, Some(done));

        task.toggle(done);
        assert!(!task.is_completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.created_at, created);
    }

    #[test]
    fn serializes_with_camel_case_and_null_completion() {
        let created = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let task = Task::new("1741064767000", "Write report", created);
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["createdAt"], "2025-03-04T05:06:07Z");
        assert!(json["completedAt"].is_null());
    }

    #[test]
    fn deserializes_records_missing_optional_fields() {
        let raw = r#"{"id":"1","title":"Old","createdAt":"2024-12-31T23:59:59.000Z"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();

        assert!(!task.is_completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.title, "Old");
    }
}
