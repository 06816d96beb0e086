use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Stable task identifier. A random v4 UUID so two tasks created within the
// same clock tick never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> TaskId {
        TaskId(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        TaskId::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// The persisted record. Field names match the stored layout, so `created_at`
// is written as `createdAt`. Unknown fields are a schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub starred: bool,
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    // Build a fresh, open, unstarred task. `text` is expected to be trimmed already.
    pub fn new(text: impl Into<String>, date: Option<NaiveDate>, created_at: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::new(),
            text: text.into(),
            completed: false,
            starred: false,
            date,
            created_at,
        }
    }

    // True when the task is open and its due day lies before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.date.is_some_and(|date| date < today)
    }
}
