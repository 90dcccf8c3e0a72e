use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;

use depot_core::key::ShareKey;
use depot_registry::RegistryError;

use crate::error::ServerError;

use super::AppState;
use super::schemas::ErrorResponse;

/// `GET /download/{key}` -- the capability URL behind every share link.
///
/// Anonymous by design: resolves the record, increments its download
/// counter and streams the blob as an attachment. An unknown (or
/// malformed) key renders the distinct `file_not_found` state.
#[utoipa::path(
    get,
    path = "/download/{key}",
    tag = "Download",
    summary = "Download a shared file",
    params(("key" = String, Path, description = "Share key")),
    responses(
        (status = 200, description = "File content streamed as an attachment"),
        (status = 404, description = "Unknown share key", body = ErrorResponse)
    )
)]
pub async fn download(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ServerError> {
    let key = ShareKey::parse(&key).map_err(|_| RegistryError::NotFound(key.clone()))?;
    let (record, data) = state.registry.download(&key).await?;

    let content_type = HeaderValue::from_str(&record.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = attachment_disposition(&record.name);

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_DISPOSITION, disposition)
        .body(Body::from(data))
        .map_err(|e| ServerError::Config(format!("failed to build download response: {e}")))
}

/// Build a `Content-Disposition: attachment` value, dropping characters
/// that would break the quoted filename.
fn attachment_disposition(name: &str) -> HeaderValue {
    let safe: String = name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && c.is_ascii())
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
