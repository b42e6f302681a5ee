use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata for a stored attachment. The bytes live in the object store;
/// this row only references them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    pub id: Uuid,
    /// The task this attachment belongs to.
    pub task_id: Uuid,
    /// Object-store key (timestamp-prefixed original filename).
    pub file_name: String,
    /// Publicly resolvable URL for the stored object.
    pub file_url: String,
    /// Content type as declared by the uploader, not sniffed.
    pub file_type: String,
}
