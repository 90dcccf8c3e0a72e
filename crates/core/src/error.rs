use thiserror::Error;

/// Errors from constructing or validating domain values.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A share key failed validation (wrong length or alphabet).
    #[error("invalid share key: {0}")]
    InvalidShareKey(String),

    /// A file name was empty after sanitization.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),
}
