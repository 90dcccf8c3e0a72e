/// Outcome of the access-gate decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through.
    Allow,
    /// Protected path with no session: send the caller to the login page.
    RedirectToLogin,
    /// Auth-only path with an active session: send the caller to the dashboard.
    RedirectToDashboard,
}

/// Static routing policy: which path prefixes require a session and which
/// exact paths require the absence of one. Fixed at startup.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    protected_prefixes: Vec<String>,
    auth_only_paths: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new(
            ["/dashboard", "/upload"].map(str::to_owned).to_vec(),
            ["/login", "/signup"].map(str::to_owned).to_vec(),
        )
    }
}

impl RoutePolicy {
    /// Build a policy from explicit route sets.
    #[must_use]
    pub fn new(protected_prefixes: Vec<String>, auth_only_paths: Vec<String>) -> Self {
        Self {
            protected_prefixes,
            auth_only_paths,
        }
    }

    /// Decide the gate outcome for a request path.
    ///
    /// Pure function of (path, session presence); callers must re-evaluate
    /// on every request rather than caching the result. The protected-route
    /// check runs before the auth-only check; with the default sets the two
    /// cannot both match, but the order is load-bearing if the sets are
    /// ever extended.
    #[must_use]
    pub fn decide(&self, path: &str, session_present: bool) -> GateDecision {
        let is_protected = self
            .protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()));
        if is_protected && !session_present {
            return GateDecision::RedirectToLogin;
        }

        let is_auth_only = self.auth_only_paths.iter().any(|p| p == path);
        if is_auth_only && session_present {
            return GateDecision::RedirectToDashboard;
        }

        GateDecision::Allow
    }
}
