mod s3;

pub use s3::S3Store;

use async_trait::async_trait;
use bytes::Bytes;

/// Object-store failures. Wrapped into `AppError::Storage` at the API
/// boundary.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// The slice of object-store behavior this application needs: store bytes
/// under a key with a declared content type, and delete by key. Behind a
/// trait so tests can substitute a fake.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write (create or overwrite) an object.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Delete an object. No-op if absent.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
