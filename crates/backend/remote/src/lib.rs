//! Remote backend for Depot.
//!
//! Implements the three backend capability traits against the managed
//! service's REST surface: `/auth/v1` for accounts and sessions,
//! `/storage/v1/object/{bucket}` for blobs, and `/rest/v1` (plus an RPC
//! for the atomic download-counter increment) for file records.
//!
//! The handle is constructed from the resolved endpoint and public access
//! key. Missing configuration does not prevent construction: calls against
//! an unconfigured handle fail with [`BackendError::Connection`] at call
//! time, which is the degraded mode the server deliberately starts in when
//! the environment is incomplete.

mod auth;
mod blob;
mod records;
mod wire;

use std::time::Duration;

use tokio::sync::broadcast;

use depot_backend::error::BackendError;
use depot_core::session::SessionEvent;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Storage bucket holding uploaded files.
const BUCKET: &str = "files";

/// Handle to the remote managed backend.
pub struct RemoteBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    events: broadcast::Sender<SessionEvent>,
}

impl RemoteBackend {
    /// Create a handle bound to the given endpoint and public access key.
    ///
    /// Empty values are accepted; see the crate docs for degraded mode.
    #[must_use]
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            http: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            anon_key: anon_key.into(),
            events,
        }
    }

    /// Whether both configuration values are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.anon_key.is_empty()
    }

    /// Build an absolute URL, or fail when the endpoint was never resolved.
    fn endpoint(&self, path: &str) -> Result<String, BackendError> {
        if self.base_url.is_empty() {
            return Err(BackendError::Connection(
                "backend endpoint is not configured".to_owned(),
            ));
        }
        Ok(format!("{}{path}", self.base_url))
    }

    /// Attach the public access key headers every call carries.
    fn with_keys(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Map a transport-level error onto the backend taxonomy.
pub(crate) fn transport_error(err: &reqwest::Error) -> BackendError {
    if err.is_connect() || err.is_timeout() {
        BackendError::Connection(err.to_string())
    } else {
        BackendError::Backend(err.to_string())
    }
}
