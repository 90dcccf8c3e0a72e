use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use bytes::Bytes;

use depot_core::key::ShareKey;
use depot_core::types::FileId;
use depot_registry::RegistryError;

use crate::error::ServerError;
use crate::gate::CurrentSession;

use super::AppState;
use super::schemas::{ErrorResponse, FileResponse, SharedFileResponse};

/// Fallback name and content type for multipart fields that declare none.
const DEFAULT_NAME: &str = "upload";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// `POST /v1/files` (also `POST /upload`) -- store a file and register it.
#[utoipa::path(
    post,
    path = "/v1/files",
    tag = "Files",
    summary = "Upload a file",
    request_body(content = String, content_type = "multipart/form-data", description = "A `file` part with the payload"),
    responses(
        (status = 201, description = "File stored and registered", body = FileResponse),
        (status = 400, description = "No file part in the request", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    let identity = current.require()?.clone();

    let mut part: Option<(String, String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let name = field
                .file_name()
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_NAME)
                .to_owned();
            let content_type = field
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_owned();
            let data = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("failed to read file part: {e}")))?;
            part = Some((name, content_type, data));
            break;
        }
    }

    let Some((name, content_type, data)) = part else {
        return Err(ServerError::BadRequest(
            "request carries no `file` part".to_owned(),
        ));
    };

    let record = state
        .registry
        .upload(identity.id, &name, &content_type, data, None)
        .await?;

    let body = FileResponse::from_record(&record, &state.external_url);
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// `GET /v1/files` -- the caller's files, newest first.
#[utoipa::path(
    get,
    path = "/v1/files",
    tag = "Files",
    summary = "List own files",
    responses(
        (status = 200, description = "Files owned by the caller", body = [FileResponse]),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<Vec<FileResponse>>, ServerError> {
    let identity = current.require()?;
    let records = state.registry.list(&identity.id).await?;
    Ok(Json(
        records
            .iter()
            .map(|record| FileResponse::from_record(record, &state.external_url))
            .collect(),
    ))
}

/// `DELETE /v1/files/{id}` -- remove an owned file and its blob.
///
/// The `(id, path)` pair handed to the registry comes from the caller's own
/// records, never from the request, so a foreign id cannot reach anyone
/// else's blob. Idempotent: an id that no longer matches one of the
/// caller's records is a no-op success, so retries after a partial failure
/// and double-clicks both complete cleanly.
#[utoipa::path(
    delete,
    path = "/v1/files/{id}",
    tag = "Files",
    summary = "Delete a file",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 204, description = "File deleted (or already gone)"),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let identity = current.require()?;
    let id = FileId::parse(&id)
        .map_err(|_| ServerError::BadRequest(format!("invalid record id: {id}")))?;

    let records = state.registry.list(&identity.id).await?;
    let Some(record) = records.iter().find(|r| r.id == id) else {
        return Ok(StatusCode::NO_CONTENT);
    };

    state
        .registry
        .delete(&identity.id, &record.id, &record.path)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /v1/shared/{key}` -- public metadata for a shared file.
///
/// No identity check: the key is the capability. A malformed key is
/// indistinguishable from an unissued one.
#[utoipa::path(
    get,
    path = "/v1/shared/{key}",
    tag = "Files",
    summary = "Resolve a share key",
    params(("key" = String, Path, description = "Share key")),
    responses(
        (status = 200, description = "File metadata", body = SharedFileResponse),
        (status = 404, description = "Unknown share key", body = ErrorResponse)
    )
)]
pub async fn resolve(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SharedFileResponse>, ServerError> {
    let key =
        ShareKey::parse(&key).map_err(|_| RegistryError::NotFound(key.clone()))?;
    let record = state.registry.resolve(&key).await?;
    Ok(Json(SharedFileResponse::from(&record)))
}
