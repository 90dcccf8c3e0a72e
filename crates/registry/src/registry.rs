use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, instrument, warn};

use depot_backend::blob::BlobStore;
use depot_backend::error::BackendError;
use depot_backend::records::RecordStore;
use depot_core::file::FileRecord;
use depot_core::key::{ShareKey, StoragePath};
use depot_core::types::{FileId, OwnerId};

use crate::error::RegistryError;
use crate::progress::{MonotonicProgress, ProgressObserver};

/// Build the shareable capability URL for a key: `{origin}/download/{key}`.
///
/// The key is the sole credential; anyone holding the link can resolve and
/// download the file.
#[must_use]
pub fn share_link(origin: &str, key: &ShareKey) -> String {
    format!("{}/download/{key}", origin.trim_end_matches('/'))
}

/// The file registry: upload, list, resolve, download and delete, composed
/// over the injected blob and record capabilities.
///
/// Uploads and deletes are two-step writes with no spanning transaction.
/// The accepted inconsistency windows — an orphaned blob when the metadata
/// insert fails, dangling metadata when the record delete fails — are
/// logged where they open and tolerated on retry; there is no
/// reconciliation sweep.
pub struct FileRegistry {
    blob: Arc<dyn BlobStore>,
    records: Arc<dyn RecordStore>,
}

impl FileRegistry {
    #[must_use]
    pub fn new(blob: Arc<dyn BlobStore>, records: Arc<dyn RecordStore>) -> Self {
        Self { blob, records }
    }

    /// Store a file and register its metadata.
    ///
    /// Generates the share key, composes the storage path, writes the blob,
    /// then inserts the record with a zero download counter. A blob failure
    /// leaves no record behind; a record failure after a successful blob
    /// write orphans the blob.
    #[instrument(skip(self, data, progress), fields(owner = %owner, size = data.len()))]
    pub async fn upload(
        &self,
        owner: OwnerId,
        name: &str,
        content_type: &str,
        data: Bytes,
        progress: Option<ProgressObserver>,
    ) -> Result<FileRecord, RegistryError> {
        let key = ShareKey::generate();
        let path = StoragePath::compose(&owner, &key, name)?;
        let size = data.len() as u64;

        let progress_fn = progress.map(|observer| MonotonicProgress::new(observer).into_progress_fn());
        self.blob
            .put(&path, content_type, data, progress_fn)
            .await?;

        let record = FileRecord::new(owner, name, size, content_type, key, path);
        if let Err(e) = self.records.insert(&record).await {
            // The blob is already written; it stays orphaned at this path.
            warn!(path = %record.path, error = %e, "metadata insert failed after blob write");
            return Err(e.into());
        }

        info!(key = %record.unique_key, "file uploaded");
        Ok(record)
    }

    /// All files owned by `owner`, newest first.
    pub async fn list(&self, owner: &OwnerId) -> Result<Vec<FileRecord>, RegistryError> {
        Ok(self.records.list_by_owner(owner).await?)
    }

    /// Resolve a share key to its record. Public: the key is the only
    /// credential required.
    pub async fn resolve(&self, key: &ShareKey) -> Result<FileRecord, RegistryError> {
        self.records
            .find_by_key(key)
            .await?
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }

    /// Resolve, count and fetch: the download path behind a share link.
    ///
    /// The counter increment and the blob fetch are independent. An
    /// increment failure is logged and the download proceeds; a fetch
    /// failure after a successful increment leaves the counter harmlessly
    /// inflated.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn download(&self, key: &ShareKey) -> Result<(FileRecord, Bytes), RegistryError> {
        let mut record = self.resolve(key).await?;

        match self.records.increment_downloads(&record.id).await {
            Ok(downloads) => record.downloads = downloads,
            Err(e) => warn!(error = %e, "download-counter increment failed"),
        }

        match self.blob.get(&record.path).await? {
            Some(data) => Ok((record, data)),
            None => {
                // Metadata without a backing blob: the delete-side
                // inconsistency window, observed from the read path.
                warn!(path = %record.path, "record has no backing blob");
                Err(RegistryError::NotFound(key.to_string()))
            }
        }
    }

    /// Remove the blob, then the record. Owner-scoped; idempotent — an
    /// already-absent blob counts as removed, so a retry after a partial
    /// failure completes the delete.
    #[instrument(skip(self), fields(owner = %owner, id = %id))]
    pub async fn delete(
        &self,
        owner: &OwnerId,
        id: &FileId,
        path: &StoragePath,
    ) -> Result<(), RegistryError> {
        let existed = self.blob.delete(path).await?;
        if !existed {
            info!(%path, "blob already absent on delete");
        }

        match self.records.delete(id, owner).await {
            Ok(_) => {
                info!("file deleted");
                Ok(())
            }
            Err(e @ BackendError::Denied(_)) => Err(e.into()),
            Err(e) => {
                // Blob is gone but the record remains; a retry will see the
                // absent blob as success and clear the record.
                warn!(error = %e, "record delete failed after blob removal");
                Err(e.into())
            }
        }
    }
}
