use thiserror::Error;

/// Errors from backend (auth, blob, record) operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached (network failure, unresolved
    /// endpoint, missing configuration).
    #[error("connection error: {0}")]
    Connection(String),

    /// The addressed entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated (duplicate account, duplicate
    /// share key).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller is not allowed to perform this operation on this entity.
    #[error("denied: {0}")]
    Denied(String),

    /// Sign-in was rejected. Deliberately carries no detail about which
    /// part of the credentials was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Any other backend-reported failure.
    #[error("backend error: {0}")]
    Backend(String),
}
