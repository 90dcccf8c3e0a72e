use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::{COOKIE, LOCATION};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tower::{Layer, Service};
use tracing::warn;

use depot_backend::auth::{AuthBackend, SessionToken};
use depot_core::routes::{GateDecision, RoutePolicy};
use depot_core::session::Identity;

/// Name of the session cookie set on login.
pub const SESSION_COOKIE: &str = "depot_session";

/// The session resolved for the current request, injected into request
/// extensions by the gate. `None` means no (or an invalid) credential.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Identity>);

impl CurrentSession {
    /// The identity, or an unauthorized error for handlers that require one.
    pub fn require(&self) -> Result<&Identity, crate::error::ServerError> {
        self.0.as_ref().ok_or_else(|| {
            crate::error::ServerError::Unauthorized("authentication required".to_owned())
        })
    }
}

/// Tower layer that adds the access gate in front of every route.
#[derive(Clone)]
pub struct GateLayer {
    auth: Arc<dyn AuthBackend>,
    policy: Arc<RoutePolicy>,
}

impl GateLayer {
    pub fn new(auth: Arc<dyn AuthBackend>, policy: Arc<RoutePolicy>) -> Self {
        Self { auth, policy }
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateService {
            inner,
            auth: Arc::clone(&self.auth),
            policy: Arc::clone(&self.policy),
        }
    }
}

/// Tower service that resolves the session and applies the route policy.
///
/// The session is resolved against the backend on every request; the
/// decision is never cached across requests. A backend failure during
/// resolution is treated as an absent session (fail open to logged out)
/// and logged.
#[derive(Clone)]
pub struct GateService<S> {
    inner: S,
    auth: Arc<dyn AuthBackend>,
    policy: Arc<RoutePolicy>,
}

impl<S> Service<Request<Body>> for GateService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let auth = Arc::clone(&self.auth);
        let policy = Arc::clone(&self.policy);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let identity = match extract_token(req.headers()) {
                Some(token) => match auth.session(&token).await {
                    Ok(identity) => identity,
                    Err(e) => {
                        warn!(error = %e, "session resolution failed, treating as logged out");
                        None
                    }
                },
                None => None,
            };

            let path = req.uri().path().to_owned();
            let decision = policy.decide(&path, identity.is_some());
            req.extensions_mut().insert(CurrentSession(identity));

            match decision {
                GateDecision::Allow => inner.call(req).await,
                GateDecision::RedirectToLogin => Ok(redirect("/login")),
                GateDecision::RedirectToDashboard => Ok(redirect("/dashboard")),
            }
        })
    }
}

fn redirect(location: &str) -> Response {
    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(LOCATION, location)
        .body(Body::empty())
        .unwrap_or_default()
}

/// Pull the session credential off the request headers:
/// `Authorization: Bearer` first, then the session cookie.
pub fn extract_token(headers: &axum::http::HeaderMap) -> Option<SessionToken> {
    if let Some(header) = headers.get("authorization")
        && let Ok(value) = header.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(SessionToken::new(token));
    }

    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else { continue };
        for pair in value.split(';') {
            if let Some((name, token)) = pair.trim().split_once('=')
                && name == SESSION_COOKIE
                && !token.is_empty()
            {
                return Some(SessionToken::new(token));
            }
        }
    }

    None
}
