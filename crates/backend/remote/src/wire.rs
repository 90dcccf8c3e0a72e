//! Wire DTOs for the remote REST surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use depot_core::file::FileRecord;
use depot_core::key::{ShareKey, StoragePath};
use depot_core::session::Identity;
use depot_core::types::{FileId, OwnerId};

use depot_backend::error::BackendError;

/// User object returned by the auth endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub id: Uuid,
    pub email: String,
}

impl From<UserResponse> for Identity {
    fn from(user: UserResponse) -> Self {
        Self {
            id: OwnerId::from(user.id),
            email: user.email,
        }
    }
}

/// Response of the password-grant token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub user: UserResponse,
}

/// One row of the `files` table.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FileRow {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub unique_key: String,
    pub downloads: u64,
    pub path: String,
    pub owner_id: Uuid,
}

impl FileRow {
    pub(crate) fn from_record(record: &FileRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            name: record.name.clone(),
            size: record.size,
            content_type: record.content_type.clone(),
            created_at: record.created_at,
            unique_key: record.unique_key.as_str().to_owned(),
            downloads: record.downloads,
            path: record.path.as_str().to_owned(),
            owner_id: *record.owner.as_uuid(),
        }
    }

    pub(crate) fn into_record(self) -> Result<FileRecord, BackendError> {
        let unique_key = ShareKey::parse(&self.unique_key)
            .map_err(|e| BackendError::Backend(format!("malformed row: {e}")))?;
        Ok(FileRecord {
            id: FileId::from(self.id),
            name: self.name,
            size: self.size,
            content_type: self.content_type,
            created_at: self.created_at,
            unique_key,
            downloads: self.downloads,
            path: StoragePath::from_raw(self.path),
            owner: OwnerId::from(self.owner_id),
        })
    }
}
