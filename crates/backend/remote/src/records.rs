use async_trait::async_trait;
use reqwest::StatusCode;

use depot_backend::error::BackendError;
use depot_backend::records::RecordStore;
use depot_core::file::FileRecord;
use depot_core::key::ShareKey;
use depot_core::types::{FileId, OwnerId};

use crate::wire::FileRow;
use crate::{RemoteBackend, transport_error};

/// Table holding file metadata.
const TABLE: &str = "files";

#[async_trait]
impl RecordStore for RemoteBackend {
    async fn insert(&self, record: &FileRecord) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("/rest/v1/{TABLE}"))?;
        let response = self
            .with_keys(self.http.post(url))
            .header("prefer", "return=minimal")
            .json(&FileRow::from_record(record))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(BackendError::Conflict(format!(
                "share key already taken: {}",
                record.unique_key
            ))),
            status => Err(BackendError::Backend(format!(
                "record insert failed: {status}"
            ))),
        }
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<FileRecord>, BackendError> {
        let url = self.endpoint(&format!(
            "/rest/v1/{TABLE}?owner_id=eq.{owner}&select=*&order=created_at.desc"
        ))?;
        let response = self
            .with_keys(self.http.get(url))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if !response.status().is_success() {
            return Err(BackendError::Backend(format!(
                "record list failed: {}",
                response.status()
            )));
        }
        let rows: Vec<FileRow> = response.json().await.map_err(|e| transport_error(&e))?;
        rows.into_iter().map(FileRow::into_record).collect()
    }

    async fn find_by_key(&self, key: &ShareKey) -> Result<Option<FileRecord>, BackendError> {
        let url = self.endpoint(&format!(
            "/rest/v1/{TABLE}?unique_key=eq.{key}&select=*&limit=1"
        ))?;
        let response = self
            .with_keys(self.http.get(url))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if !response.status().is_success() {
            return Err(BackendError::Backend(format!(
                "record lookup failed: {}",
                response.status()
            )));
        }
        let mut rows: Vec<FileRow> = response.json().await.map_err(|e| transport_error(&e))?;
        match rows.pop() {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    async fn increment_downloads(&self, id: &FileId) -> Result<u64, BackendError> {
        // Server-side atomic increment; a client-side read-modify-write
        // would lose updates under concurrent downloads.
        let url = self.endpoint("/rest/v1/rpc/increment_downloads")?;
        let response = self
            .with_keys(self.http.post(url))
            .json(&serde_json::json!({ "row_id": id }))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            status if status.is_success() => {
                response.json().await.map_err(|e| transport_error(&e))
            }
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(format!("file record {id}"))),
            status => Err(BackendError::Backend(format!(
                "download-counter increment failed: {status}"
            ))),
        }
    }

    /// Ownership is enforced by the service's row filters: the delete is
    /// scoped to `owner_id`, so a foreign record simply matches nothing and
    /// reports `false` rather than `Denied`.
    async fn delete(&self, id: &FileId, owner: &OwnerId) -> Result<bool, BackendError> {
        let url = self.endpoint(&format!(
            "/rest/v1/{TABLE}?id=eq.{id}&owner_id=eq.{owner}"
        ))?;
        let response = self
            .with_keys(self.http.delete(url))
            .header("prefer", "return=representation")
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if !response.status().is_success() {
            return Err(BackendError::Backend(format!(
                "record delete failed: {}",
                response.status()
            )));
        }
        let removed: Vec<FileRow> = response.json().await.map_err(|e| transport_error(&e))?;
        Ok(!removed.is_empty())
    }
}
