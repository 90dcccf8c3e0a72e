use async_trait::async_trait;

use depot_core::file::FileRecord;
use depot_core::key::ShareKey;
use depot_core::types::{FileId, OwnerId};

use crate::error::BackendError;

/// Relational capability of the backend: the `files` table.
///
/// Implementations must be safe for concurrent access; in particular
/// [`increment_downloads`](Self::increment_downloads) must be atomic on the
/// backend side so simultaneous downloads never lose an increment.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. Fails with [`BackendError::Conflict`] when the
    /// share key is already taken.
    async fn insert(&self, record: &FileRecord) -> Result<(), BackendError>;

    /// All records owned by `owner`, newest first. Unbounded by design.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<FileRecord>, BackendError>;

    /// Look up the record for a share key. Returns `None` when no record
    /// matches; the key is the only credential required.
    async fn find_by_key(&self, key: &ShareKey) -> Result<Option<FileRecord>, BackendError>;

    /// Atomically increment the download counter, returning the new value.
    /// Fails with [`BackendError::NotFound`] for an unknown record.
    async fn increment_downloads(&self, id: &FileId) -> Result<u64, BackendError>;

    /// Delete the record if `owner` owns it. Returns `true` if a record was
    /// removed, `false` if none existed. A record owned by someone else is
    /// [`BackendError::Denied`].
    async fn delete(&self, id: &FileId, owner: &OwnerId) -> Result<bool, BackendError>;
}
