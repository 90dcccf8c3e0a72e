use async_trait::async_trait;
use dashmap::DashMap;

use depot_backend::error::BackendError;
use depot_backend::records::RecordStore;
use depot_core::file::FileRecord;
use depot_core::key::ShareKey;
use depot_core::types::{FileId, OwnerId};

/// In-memory [`RecordStore`] backed by a [`DashMap`] with a share-key index.
///
/// The download-counter increment mutates the record under its shard lock,
/// so concurrent increments never lose an update.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, FileRecord>,
    /// `unique_key` -> record id; also enforces share-key uniqueness.
    by_key: DashMap<String, String>,
}

impl MemoryRecordStore {
    /// Create a new, empty record store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: &FileRecord) -> Result<(), BackendError> {
        // Claim the share key first; the index is the uniqueness authority.
        match self.by_key.entry(record.unique_key.as_str().to_owned()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(BackendError::Conflict(format!(
                    "share key already taken: {}",
                    record.unique_key
                )));
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(record.id.to_string());
            }
        }
        self.records.insert(record.id.to_string(), record.clone());
        Ok(())
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<FileRecord>, BackendError> {
        let mut listed: Vec<FileRecord> = self
            .records
            .iter()
            .filter(|entry| entry.owner == *owner)
            .map(|entry| entry.value().clone())
            .collect();
        // Newest first; record id as a stable tie-break for equal timestamps.
        listed.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.to_string().cmp(&a.id.to_string()))
        });
        Ok(listed)
    }

    async fn find_by_key(&self, key: &ShareKey) -> Result<Option<FileRecord>, BackendError> {
        let Some(id) = self.by_key.get(key.as_str()) else {
            return Ok(None);
        };
        Ok(self.records.get(id.value()).map(|r| r.value().clone()))
    }

    async fn increment_downloads(&self, id: &FileId) -> Result<u64, BackendError> {
        let Some(mut record) = self.records.get_mut(&id.to_string()) else {
            return Err(BackendError::NotFound(format!("file record {id}")));
        };
        record.downloads += 1;
        Ok(record.downloads)
    }

    async fn delete(&self, id: &FileId, owner: &OwnerId) -> Result<bool, BackendError> {
        let key = {
            let Some(record) = self.records.get(&id.to_string()) else {
                return Ok(false);
            };
            if record.owner != *owner {
                return Err(BackendError::Denied(format!(
                    "record {id} is not owned by {owner}"
                )));
            }
            record.unique_key.as_str().to_owned()
        };

        self.records.remove(&id.to_string());
        self.by_key.remove(&key);
        Ok(true)
    }
}
