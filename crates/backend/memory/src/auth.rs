use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use depot_backend::auth::{AuthBackend, SessionToken};
use depot_backend::error::BackendError;
use depot_core::session::{Identity, SessionEvent};
use depot_core::types::OwnerId;

/// Registered account.
#[derive(Debug, Clone)]
struct UserEntry {
    identity: Identity,
    /// PHC-format argon2 hash.
    password_hash: String,
}

/// In-memory [`AuthBackend`] backed by [`DashMap`] tables.
///
/// Tokens are opaque uuids held server-side, so sign-out revokes exactly.
/// Session-change events are fanned out on a broadcast channel; sends are
/// fire-and-forget and a lagged receiver misses events.
pub struct MemoryAuthBackend {
    users: DashMap<String, UserEntry>,
    tokens: DashMap<String, Identity>,
    events: broadcast::Sender<SessionEvent>,
}

impl MemoryAuthBackend {
    /// Create a new, empty auth backend.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            users: DashMap::new(),
            tokens: DashMap::new(),
            events,
        }
    }

    fn hash_password(password: &str) -> Result<String, BackendError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| BackendError::Backend(format!("password hashing failed: {e}")))
    }

    fn verify_password(hash: &str, candidate: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }

    fn emit(&self, event: SessionEvent) {
        // Fire-and-forget: an error only means there are no subscribers.
        let _ = self.events.send(event);
    }
}

impl Default for MemoryAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for MemoryAuthBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, BackendError> {
        let password_hash = Self::hash_password(password)?;
        let identity = Identity {
            id: OwnerId::new(),
            email: email.to_owned(),
        };

        // Entry API keeps registration check-and-insert atomic.
        match self.users.entry(email.to_owned()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(BackendError::Conflict(format!(
                "account already registered: {email}"
            ))),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(UserEntry {
                    identity: identity.clone(),
                    password_hash,
                });
                Ok(identity)
            }
        }
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SessionToken, Identity), BackendError> {
        let identity = {
            let Some(user) = self.users.get(email) else {
                return Err(BackendError::InvalidCredentials);
            };
            if !Self::verify_password(&user.password_hash, password) {
                return Err(BackendError::InvalidCredentials);
            }
            user.identity.clone()
        };

        let token = SessionToken::new(uuid::Uuid::new_v4().to_string());
        self.tokens
            .insert(token.as_str().to_owned(), identity.clone());
        self.emit(SessionEvent::SignedIn(identity.clone()));
        Ok((token, identity))
    }

    async fn session(&self, token: &SessionToken) -> Result<Option<Identity>, BackendError> {
        Ok(self.tokens.get(token.as_str()).map(|t| t.value().clone()))
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), BackendError> {
        if self.tokens.remove(token.as_str()).is_some() {
            self.emit(SessionEvent::SignedOut);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
