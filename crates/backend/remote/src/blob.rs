use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::StatusCode;

use depot_backend::blob::{BlobStore, ProgressFn};
use depot_backend::error::BackendError;
use depot_core::key::StoragePath;

use crate::{BUCKET, RemoteBackend, transport_error};

/// Characters escaped inside one object-path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a storage path segment-by-segment, keeping `/` as the
/// separator.
pub(crate) fn encode_object_path(path: &StoragePath) -> String {
    path.as_str()
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Upload chunk size; progress is reported once per chunk pulled by the
/// transport.
const CHUNK_SIZE: usize = 64 * 1024;

fn progress_body(data: Bytes, total: u64, progress: ProgressFn) -> reqwest::Body {
    let transferred = Arc::new(AtomicU64::new(0));
    let chunks: Vec<Bytes> = data
        .chunks(CHUNK_SIZE)
        .map(Bytes::copy_from_slice)
        .collect();
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        let sent =
            transferred.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
        progress(sent, total);
        Ok::<Bytes, std::io::Error>(chunk)
    }));
    reqwest::Body::wrap_stream(stream)
}

#[async_trait]
impl BlobStore for RemoteBackend {
    async fn put(
        &self,
        path: &StoragePath,
        content_type: &str,
        data: Bytes,
        progress: Option<ProgressFn>,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!(
            "/storage/v1/object/{BUCKET}/{}",
            encode_object_path(path)
        ))?;

        let total = data.len() as u64;
        let body = match progress {
            Some(progress) => progress_body(data, total, progress),
            None => reqwest::Body::from(data),
        };

        let response = self
            .with_keys(self.http.post(url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(BackendError::Conflict(format!(
                "blob already exists at {path}"
            ))),
            StatusCode::FORBIDDEN => Err(BackendError::Denied(format!("blob write to {path}"))),
            status => Err(BackendError::Backend(format!("blob write failed: {status}"))),
        }
    }

    async fn get(&self, path: &StoragePath) -> Result<Option<Bytes>, BackendError> {
        let url = self.endpoint(&format!(
            "/storage/v1/object/{BUCKET}/{}",
            encode_object_path(path)
        ))?;
        let response = self
            .with_keys(self.http.get(url))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            status if status.is_success() => Ok(Some(
                response.bytes().await.map_err(|e| transport_error(&e))?,
            )),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(BackendError::Backend(format!("blob read failed: {status}"))),
        }
    }

    async fn delete(&self, path: &StoragePath) -> Result<bool, BackendError> {
        let url = self.endpoint(&format!(
            "/storage/v1/object/{BUCKET}/{}",
            encode_object_path(path)
        ))?;
        let response = self
            .with_keys(self.http.delete(url))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            // Already absent: success from the caller's point of view.
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(BackendError::Backend(format!(
                "blob delete failed: {status}"
            ))),
        }
    }
}
