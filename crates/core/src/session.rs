use serde::{Deserialize, Serialize};

use crate::types::OwnerId;

/// The authenticated identity attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Owner id, used to scope file records.
    pub id: OwnerId,
    /// Email address the account was registered with.
    pub email: String,
}

/// Session state visible to callers.
///
/// Exactly one of three values at any time. `Loading` exists only between
/// construction and the resolution of the initial backend query; the
/// reducer never re-enters it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The initial backend query is still outstanding. Identity-dependent
    /// logic must not act on this state.
    #[default]
    Loading,
    /// No authenticated identity.
    Absent,
    /// An authenticated identity is present.
    Present(Identity),
}

impl SessionState {
    /// Whether an identity is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Whether the initial resolution is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The identity, if present.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Present(identity) => Some(identity),
            _ => None,
        }
    }
}

/// A session-change event, either the resolution of the initial query or a
/// backend-pushed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The initial session query resolved.
    Resolved(Option<Identity>),
    /// A sign-in completed.
    SignedIn(Identity),
    /// The session ended (sign-out or invalidation).
    SignedOut,
    /// The session token was refreshed; the identity is unchanged or updated.
    TokenRefreshed(Identity),
}

/// Fold a session-change event into the current state.
///
/// Pure function of (state, event); the transport delivering events is
/// irrelevant. Never returns `Loading`, so once the initial query resolves
/// the loading flag can never reappear.
#[must_use]
pub fn reduce(state: SessionState, event: SessionEvent) -> SessionState {
    let _ = state;
    match event {
        SessionEvent::Resolved(Some(identity))
        | SessionEvent::SignedIn(identity)
        | SessionEvent::TokenRefreshed(identity) => SessionState::Present(identity),
        SessionEvent::Resolved(None) | SessionEvent::SignedOut => SessionState::Absent,
    }
}
