use serde::Deserialize;

/// Top-level configuration for the Depot server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct DepotConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend selection and connection values.
    #[serde(default)]
    pub backend: BackendConfig,
}

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// External URL used when building share links
    /// (e.g. `https://depot.example.com`).
    ///
    /// If not set, defaults to `http://{host}:{port}`.
    pub external_url: Option<String>,
    /// Graceful shutdown timeout in seconds: the maximum time to wait for
    /// in-flight requests to finish.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            external_url: None,
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// The origin share links are built against.
    #[must_use]
    pub fn external_url(&self) -> String {
        self.external_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

/// Which backend implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-process backend; state lives for the process lifetime.
    #[default]
    Memory,
    /// Remote managed service over REST.
    Remote,
}

impl BackendKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Remote => "remote",
        }
    }
}

/// Environment variable names for the backend endpoint, primary first.
pub const URL_VARS: (&str, &str) = ("DEPOT_BACKEND_URL", "BACKEND_URL");
/// Environment variable names for the public access key, primary first.
pub const ANON_KEY_VARS: (&str, &str) = ("DEPOT_BACKEND_ANON_KEY", "BACKEND_ANON_KEY");

/// Backend selection and connection values.
///
/// The endpoint and public access key may come from the TOML file or from
/// the environment (primary name first, fallback name second, TOML value
/// last). Missing values are reported, logged and tolerated: the server
/// starts degraded and backend calls fail at call time.
#[derive(Debug, Default, Deserialize)]
pub struct BackendConfig {
    /// Backend implementation to use.
    #[serde(default)]
    pub kind: BackendKind,
    /// Service endpoint URL (remote backend).
    pub url: Option<String>,
    /// Public access key (remote backend).
    pub anon_key: Option<String>,
}

impl BackendConfig {
    /// Fill unset values from the environment.
    pub fn resolve_env(&mut self) {
        self.resolve_with(|name| std::env::var(name).ok());
    }

    /// Fill unset values using `lookup`; environment-variable resolution
    /// with the lookup seam exposed for tests.
    pub fn resolve_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.url.is_none() {
            self.url = resolve_pair(&lookup, URL_VARS);
        }
        if self.anon_key.is_none() {
            self.anon_key = resolve_pair(&lookup, ANON_KEY_VARS);
        }
    }

    /// Names of required values that are still absent. Only the remote
    /// backend requires connection values.
    #[must_use]
    pub fn missing_values(&self) -> Vec<&'static str> {
        if self.kind != BackendKind::Remote {
            return Vec::new();
        }
        let mut missing = Vec::new();
        if self.url.as_deref().is_none_or(str::is_empty) {
            missing.push(URL_VARS.0);
        }
        if self.anon_key.as_deref().is_none_or(str::is_empty) {
            missing.push(ANON_KEY_VARS.0);
        }
        missing
    }
}

/// First non-empty value of (primary, fallback).
fn resolve_pair(
    lookup: &impl Fn(&str) -> Option<String>,
    (primary, fallback): (&str, &str),
) -> Option<String> {
    lookup(primary)
        .filter(|v| !v.is_empty())
        .or_else(|| lookup(fallback).filter(|v| !v.is_empty()))
}
