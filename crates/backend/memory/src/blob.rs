use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use depot_backend::blob::{BlobStore, ProgressFn};
use depot_backend::error::BackendError;
use depot_core::key::StoragePath;

/// In-memory [`BlobStore`] backed by a [`DashMap`].
///
/// Stores raw bytes only; the declared content type lives on the metadata
/// record, which is what the download path serves from.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
}

impl MemoryBlobStore {
    /// Create a new, empty blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        path: &StoragePath,
        _content_type: &str,
        data: Bytes,
        progress: Option<ProgressFn>,
    ) -> Result<(), BackendError> {
        let total = data.len() as u64;

        // Entry API: insert only if vacant, matching upsert-free semantics.
        match self.blobs.entry(path.as_str().to_owned()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(BackendError::Conflict(format!(
                    "blob already exists at {path}"
                )));
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(data);
            }
        }

        // The whole payload lands in one step here; report completion once.
        if let Some(progress) = progress {
            progress(total, total);
        }
        Ok(())
    }

    async fn get(&self, path: &StoragePath) -> Result<Option<Bytes>, BackendError> {
        Ok(self.blobs.get(path.as_str()).map(|b| b.value().clone()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<bool, BackendError> {
        Ok(self.blobs.remove(path.as_str()).is_some())
    }
}
