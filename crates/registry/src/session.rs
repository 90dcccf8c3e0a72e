use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use depot_backend::auth::{AuthBackend, SessionToken};
use depot_core::session::{SessionEvent, SessionState, reduce};

/// Observable session state for a UI runtime.
///
/// On spawn the store asynchronously queries the backend for an existing
/// session; until that query resolves the published state is
/// [`SessionState::Loading`] and identity-dependent logic must not act.
/// Resolution failures fail open to logged-out (logged, not surfaced).
/// After resolution the store folds backend session-change events through
/// the pure reducer and publishes each new state; the loading state is
/// never re-entered. Observers subscribe via a watch channel, so exactly
/// one state value is visible at a time.
pub struct SessionStore {
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionStore {
    /// Start the store: resolve the initial session for `initial_token`
    /// (if any), then consume the backend's session-change subscription
    /// until shutdown.
    #[must_use]
    pub fn spawn(auth: Arc<dyn AuthBackend>, initial_token: Option<SessionToken>) -> Self {
        let (tx, rx) = watch::channel(SessionState::Loading);
        // Subscribe before the initial query so a change that lands while
        // the query is outstanding is queued, not lost.
        let mut events = auth.subscribe();

        let task = tokio::spawn(async move {
            let resolved = match initial_token {
                Some(token) => match auth.session(&token).await {
                    Ok(identity) => identity,
                    Err(e) => {
                        warn!(error = %e, "initial session query failed, treating as logged out");
                        None
                    }
                },
                None => None,
            };

            let mut state = reduce(SessionState::Loading, SessionEvent::Resolved(resolved));
            if tx.send(state.clone()).is_err() {
                return;
            }

            loop {
                match events.recv().await {
                    Ok(event) => {
                        state = reduce(state, event);
                        if tx.send(state.clone()).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "session event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self { state: rx, task }
    }

    /// The state as of now.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Whether the initial resolution is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.current().is_loading()
    }

    /// A receiver that observes every published state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Stop consuming events and release the subscription.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}
