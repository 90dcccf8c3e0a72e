use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::key::{ShareKey, StoragePath};
use crate::types::{FileId, OwnerId};

/// Metadata record for an uploaded file.
///
/// A record always has a corresponding blob at `path` until deletion. The
/// only field mutated after creation is `downloads`, which is monotonically
/// non-decreasing and incremented server-side by the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique record identifier.
    pub id: FileId,
    /// Display name of the file as uploaded.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Declared MIME content type (e.g. `"application/pdf"`).
    pub content_type: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Share key: the bearer capability for download access.
    pub unique_key: ShareKey,
    /// Number of completed download-counter increments.
    pub downloads: u64,
    /// Object-store key of the blob.
    pub path: StoragePath,
    /// Owning identity.
    pub owner: OwnerId,
}

impl FileRecord {
    /// Build a fresh record for a successful upload. The download counter
    /// starts at zero.
    #[must_use]
    pub fn new(
        owner: OwnerId,
        name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        unique_key: ShareKey,
        path: StoragePath,
    ) -> Self {
        Self {
            id: FileId::new(),
            name: name.into(),
            size,
            content_type: content_type.into(),
            created_at: Utc::now(),
            unique_key,
            downloads: 0,
            path,
            owner,
        }
    }
}
