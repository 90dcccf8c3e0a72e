use thiserror::Error;

use depot_backend::error::BackendError;
use depot_core::error::DomainError;

/// Errors from file-registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record matches the presented share key. Rendered distinctly from
    /// other failures so callers can show a "file not found" state.
    #[error("file not found: {0}")]
    NotFound(String),

    /// A domain value failed validation (bad key, empty file name).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
