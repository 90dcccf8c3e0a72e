use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use depot_core::key::StoragePath;

use crate::error::BackendError;

/// Progress side channel for uploads: `(transferred_bytes, total_bytes)`.
///
/// Invoked zero or more times during a single transfer. Carries no
/// correctness obligation; implementations must never block the transfer
/// on it.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Object-storage capability of the backend: keyed blob put/get/delete.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob under `path`. Fails with [`BackendError::Conflict`] if
    /// a blob already exists there (paths embed a fresh share key, so this
    /// only fires on key collision).
    async fn put(
        &self,
        path: &StoragePath,
        content_type: &str,
        data: Bytes,
        progress: Option<ProgressFn>,
    ) -> Result<(), BackendError>;

    /// Fetch the blob at `path`. Returns `None` if absent.
    async fn get(&self, path: &StoragePath) -> Result<Option<Bytes>, BackendError>;

    /// Remove the blob at `path`. Returns `true` if a blob existed; an
    /// already-absent blob is `Ok(false)`, never an error, so deletes stay
    /// idempotent.
    async fn delete(&self, path: &StoragePath) -> Result<bool, BackendError>;
}
