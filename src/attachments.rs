//!
//! # Attachment lifecycle
//!
//! Coordinates, per task mutation, the upload of a binary object, the
//! construction of its public URL, the persistence of attachment metadata,
//! and the removal of superseded objects.
//!
//! The relational write and the object-store write cannot share a
//! transaction, so the ordering is always upload first, row second: a failed
//! relational commit never leaves a *referenced* object orphaned, while a
//! failed upload aborts before any row is written. A crash between a
//! successful upload and the enclosing commit can still orphan an object —
//! an accepted, non-fatal residual with no compensating reconciliation here.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::AppError;
use crate::models::Attachment;
use crate::storage::ObjectStore;

/// A file payload carried by a multipart create/update request.
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    /// Content type as declared by the caller.
    pub content_type: String,
    pub data: Bytes,
}

/// Manages attachment objects and their metadata rows. One attachment per
/// task on the update path: a new upload replaces the existing row in place.
pub struct AttachmentManager {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    public_url_base: String,
}

impl AttachmentManager {
    pub fn new(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            bucket: config.bucket.clone(),
            public_url_base: config.public_url_base.trim_end_matches('/').to_string(),
        }
    }

    /// Derives the object key for an upload: current time in milliseconds
    /// prepended to the original filename, so repeated uploads of the same
    /// file never collide.
    pub fn object_key(&self, filename: &str) -> String {
        format!("{}-{}", Utc::now().timestamp_millis(), filename)
    }

    /// The publicly resolvable URL for a stored object.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_url_base, self.bucket, key)
    }

    /// Uploads the payload and inserts its metadata row inside the caller's
    /// transaction. Upload happens first; if it fails, no row is written.
    pub async fn attach(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        task_id: Uuid,
        upload: Upload,
    ) -> Result<Attachment, AppError> {
        let key = self.object_key(&upload.filename);
        self.store
            .put(&key, upload.data, &upload.content_type)
            .await?;

        let attachment = sqlx::query_as::<_, Attachment>(
            "INSERT INTO attachments (id, task_id, file_name, file_url, file_type)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, task_id, file_name, file_url, file_type",
        )
        .bind(Uuid::new_v4())
        .bind(task_id)
        .bind(&key)
        .bind(self.public_url(&key))
        .bind(&upload.content_type)
        .fetch_one(&mut **tx)
        .await?;

        Ok(attachment)
    }

    /// Replaces a task's attachment: removes the backing objects of any
    /// existing rows (best-effort), uploads the new payload, then overwrites
    /// the existing row in place, or inserts one when the task had none.
    pub async fn replace(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        task_id: Uuid,
        upload: Upload,
    ) -> Result<Attachment, AppError> {
        let existing = sqlx::query_as::<_, Attachment>(
            "SELECT id, task_id, file_name, file_url, file_type
             FROM attachments WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_all(&mut **tx)
        .await?;

        for superseded in &existing {
            if let Err(e) = self.store.delete(&superseded.file_name).await {
                log::warn!(
                    "failed to delete superseded object {}: {}",
                    superseded.file_name,
                    e
                );
            }
        }

        let key = self.object_key(&upload.filename);
        self.store
            .put(&key, upload.data, &upload.content_type)
            .await?;

        let attachment = match existing.split_first() {
            Some((row, surplus)) => {
                // The schema allows several rows per task; the replace
                // policy keeps exactly one, so any surplus rows (whose
                // objects were deleted above) go with it.
                if !surplus.is_empty() {
                    sqlx::query("DELETE FROM attachments WHERE task_id = $1 AND id <> $2")
                        .bind(task_id)
                        .bind(row.id)
                        .execute(&mut **tx)
                        .await?;
                }
                sqlx::query_as::<_, Attachment>(
                    "UPDATE attachments SET file_name = $1, file_url = $2, file_type = $3
                     WHERE id = $4
                     RETURNING id, task_id, file_name, file_url, file_type",
                )
                .bind(&key)
                .bind(self.public_url(&key))
                .bind(&upload.content_type)
                .bind(row.id)
                .fetch_one(&mut **tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Attachment>(
                    "INSERT INTO attachments (id, task_id, file_name, file_url, file_type)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING id, task_id, file_name, file_url, file_type",
                )
                .bind(Uuid::new_v4())
                .bind(task_id)
                .bind(&key)
                .bind(self.public_url(&key))
                .bind(&upload.content_type)
                .fetch_one(&mut **tx)
                .await?
            }
        };

        Ok(attachment)
    }

    /// Best-effort removal of backing objects after their rows are gone.
    /// Failures are logged, never fatal; orphaned objects are an accepted
    /// residual cost.
    pub async fn remove_objects(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.store.delete(key).await {
                log::warn!("failed to delete object {}: {}", key, e);
            }
        }
    }
}
