use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents a task entity as stored in the database and returned by the API.
///
/// `id` and `user_id` are immutable after creation; `update` only touches
/// title, description, and `updated_at`.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// Identifier of the account that owns the task.
    pub user_id: Uuid,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, with a fresh UUID and both
    /// timestamps set to now.
    pub fn new(title: String, description: Option<String>, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A task joined with its attachment (if any), as returned by the
/// single-task fetch.
#[derive(Debug, Serialize)]
pub struct TaskWithAttachment {
    #[serde(flatten)]
    pub task: Task,
    pub attachment: Option<super::Attachment>,
}
