use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use depot_core::file::FileRecord;
use depot_core::session::Identity;
use depot_registry::share_link;

/// Generic error body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message (or the `file_not_found` marker).
    pub error: String,
}

/// Signup credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Login credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// An authenticated account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Account id.
    pub id: Uuid,
    /// Registered email address.
    pub email: String,
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: *identity.id.as_uuid(),
            email: identity.email.clone(),
        }
    }
}

/// Successful login: the bearer token and the account it belongs to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Opaque session token; also set as the session cookie.
    pub token: String,
    pub user: UserResponse,
}

/// Current session state.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    /// The authenticated account, or `null` when logged out.
    pub user: Option<UserResponse>,
}

/// An owned file as shown on the dashboard.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponse {
    /// Record id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Declared MIME content type.
    pub content_type: String,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Share key.
    pub key: String,
    /// Completed download-counter increments.
    pub downloads: u64,
    /// Full shareable capability URL.
    pub share_link: String,
}

impl FileResponse {
    pub fn from_record(record: &FileRecord, origin: &str) -> Self {
        Self {
            id: *record.id.as_uuid(),
            name: record.name.clone(),
            size: record.size,
            content_type: record.content_type.clone(),
            created_at: record.created_at,
            key: record.unique_key.as_str().to_owned(),
            downloads: record.downloads,
            share_link: share_link(origin, &record.unique_key),
        }
    }
}

/// Public metadata for a shared file, resolved by key alone.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedFileResponse {
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Declared MIME content type.
    pub content_type: String,
    /// The share key the caller presented.
    pub key: String,
}

impl From<&FileRecord> for SharedFileResponse {
    fn from(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            size: record.size,
            content_type: record.content_type.clone(),
            key: record.unique_key.as_str().to_owned(),
        }
    }
}

/// Result of the configuration / connectivity probe.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectionTestResponse {
    /// Selected backend kind.
    pub backend: String,
    /// Whether all required configuration values are present.
    pub configured: bool,
    /// Primary names of the values still missing.
    pub missing: Vec<String>,
    /// Whether a backend round trip succeeded just now.
    pub reachable: bool,
}

/// Health check body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
