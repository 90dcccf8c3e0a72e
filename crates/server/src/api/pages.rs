//! Page-surface handlers.
//!
//! The view layer proper is out of scope; these routes return the state a
//! renderer would consume. What matters here is the routing surface itself:
//! these are the paths the access gate decides over.

use axum::extract::State;
use axum::{Extension, Json};

use depot_backend::auth::SessionToken;

use crate::error::ServerError;
use crate::gate::CurrentSession;

use super::AppState;
use super::schemas::{ConnectionTestResponse, FileResponse, UserResponse};

/// `GET /` -- public landing state.
pub async fn home(Extension(current): Extension<CurrentSession>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "depot",
        "version": env!("CARGO_PKG_VERSION"),
        "signed_in": current.0.is_some(),
    }))
}

/// `GET /login` -- login page state. The gate has already bounced
/// signed-in callers to the dashboard.
pub async fn login_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "page": "login" }))
}

/// `GET /signup` -- signup page state.
pub async fn signup_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "page": "signup" }))
}

/// `GET /upload` -- upload page state.
pub async fn upload_page(
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let identity = current.require()?;
    Ok(Json(serde_json::json!({
        "page": "upload",
        "user": UserResponse::from(identity),
    })))
}

/// `GET /dashboard` -- the caller's files, as the dashboard shows them.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let identity = current.require()?;
    let records = state.registry.list(&identity.id).await?;
    let files: Vec<FileResponse> = records
        .iter()
        .map(|record| FileResponse::from_record(record, &state.external_url))
        .collect();

    Ok(Json(serde_json::json!({
        "page": "dashboard",
        "user": UserResponse::from(identity),
        "files": files,
    })))
}

/// `GET /test-connection` -- configuration and connectivity probe.
///
/// Reports which configuration values are missing and whether a backend
/// round trip works right now. The probe is a session lookup with a
/// throwaway token: any non-transport answer proves the backend reachable.
#[utoipa::path(
    get,
    path = "/test-connection",
    tag = "Health",
    summary = "Backend connection test",
    responses(
        (status = 200, description = "Probe result", body = ConnectionTestResponse)
    )
)]
pub async fn test_connection(State(state): State<AppState>) -> Json<ConnectionTestResponse> {
    let reachable = state
        .auth
        .session(&SessionToken::new("connection-probe"))
        .await
        .is_ok();

    Json(ConnectionTestResponse {
        backend: state.backend_kind.to_owned(),
        configured: state.missing_config.is_empty(),
        missing: state.missing_config.as_ref().clone(),
        reachable,
    })
}
