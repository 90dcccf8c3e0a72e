use async_trait::async_trait;
use tokio::sync::broadcast;

use depot_core::session::{Identity, SessionEvent};

use crate::error::BackendError;

/// Opaque bearer credential for an authenticated session.
///
/// The token's internal structure belongs to the backend; callers only
/// store and present it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Authentication capability of the backend: account creation, session
/// issuance and retrieval, and a session-change event feed.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Register a new account. Fails with [`BackendError::Conflict`] if the
    /// email is already registered.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, BackendError>;

    /// Authenticate and open a session. Fails with
    /// [`BackendError::InvalidCredentials`] on a bad email/password pair.
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SessionToken, Identity), BackendError>;

    /// Resolve a token to its identity. Returns `None` for unknown, expired
    /// or revoked tokens; this is not an error.
    async fn session(&self, token: &SessionToken) -> Result<Option<Identity>, BackendError>;

    /// End the session for a token. Unknown tokens are ignored.
    async fn sign_out(&self, token: &SessionToken) -> Result<(), BackendError>;

    /// Subscribe to session-change events (sign-in, sign-out, refresh).
    ///
    /// Events describe changes observed by this backend handle; a lagged
    /// receiver misses events rather than blocking the sender.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}
