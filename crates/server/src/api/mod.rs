pub mod auth;
pub mod download;
pub mod files;
pub mod health;
pub mod openapi;
pub mod pages;
pub mod schemas;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use depot_backend::auth::AuthBackend;
use depot_core::routes::RoutePolicy;
use depot_registry::FileRegistry;

use crate::gate::GateLayer;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Auth capability of the backend.
    pub auth: Arc<dyn AuthBackend>,
    /// The file registry.
    pub registry: Arc<FileRegistry>,
    /// Route sets consumed by the access gate.
    pub policy: Arc<RoutePolicy>,
    /// Origin used when building share links.
    pub external_url: String,
    /// Selected backend kind, for the connection probe.
    pub backend_kind: &'static str,
    /// Primary names of configuration values missing at startup.
    pub missing_config: Arc<Vec<String>>,
}

/// Build the Axum router with all routes, the access gate, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let gate = GateLayer::new(Arc::clone(&state.auth), Arc::clone(&state.policy));

    Router::new()
        // Page surface (the routing surface the gate decides over)
        .route("/", get(pages::home))
        .route("/login", get(pages::login_page))
        .route("/signup", get(pages::signup_page))
        .route("/dashboard", get(pages::dashboard))
        .route("/upload", get(pages::upload_page).post(files::upload))
        .route("/download/{key}", get(download::download))
        .route("/test-connection", get(pages::test_connection))
        // Health
        .route("/health", get(health::health))
        // Auth API
        .route("/v1/auth/signup", post(auth::signup))
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/auth/logout", post(auth::logout))
        .route("/v1/auth/session", get(auth::session))
        // Files API
        .route("/v1/files", get(files::list).post(files::upload))
        .route("/v1/files/{id}", delete(files::delete_file))
        .route("/v1/shared/{key}", get(files::resolve))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        // The gate wraps every route: each request carries a freshly
        // resolved session before any handler sees it.
        .layer(gate)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
