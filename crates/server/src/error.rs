use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use depot_backend::error::BackendError;
use depot_registry::RegistryError;

/// Errors that can occur while serving Depot requests.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request was malformed (bad multipart body, invalid id).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The operation requires an authenticated session.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A registry-level failure surfaced through the API.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A backend call failed outside the registry (auth operations).
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ServerError {
    fn status_and_body(&self) -> (StatusCode, serde_json::Value) {
        match self {
            Self::Registry(RegistryError::NotFound(key)) => (
                StatusCode::NOT_FOUND,
                // Distinct body so clients can render the dedicated
                // "file not found" state rather than a generic error.
                serde_json::json!({ "error": "file_not_found", "key": key }),
            ),
            Self::Registry(RegistryError::Domain(e)) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": e.to_string() }),
            ),
            Self::Registry(RegistryError::Backend(e)) | Self::Backend(e) => {
                let status = match e {
                    BackendError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    BackendError::Denied(_) => StatusCode::FORBIDDEN,
                    BackendError::Conflict(_) => StatusCode::CONFLICT,
                    BackendError::NotFound(_) => StatusCode::NOT_FOUND,
                    BackendError::Connection(_) => StatusCode::BAD_GATEWAY,
                    BackendError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, serde_json::json!({ "error": e.to_string() }))
            }
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg }),
            ),
            Self::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": msg }),
            ),
            Self::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": msg }),
            ),
            Self::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": e.to_string() }),
            ),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, axum::Json(body)).into_response()
    }
}
