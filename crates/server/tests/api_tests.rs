use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use depot_backend::auth::AuthBackend;
use depot_backend::blob::BlobStore;
use depot_backend::records::RecordStore;
use depot_backend_memory::{MemoryAuthBackend, MemoryBlobStore, MemoryRecordStore};
use depot_core::routes::RoutePolicy;
use depot_registry::FileRegistry;
use depot_server::api::AppState;

// -- Helpers --------------------------------------------------------------

fn build_test_state() -> AppState {
    let auth = Arc::new(MemoryAuthBackend::new());
    let blob = Arc::new(MemoryBlobStore::new());
    let records = Arc::new(MemoryRecordStore::new());
    let registry = Arc::new(FileRegistry::new(
        blob as Arc<dyn BlobStore>,
        records as Arc<dyn RecordStore>,
    ));

    AppState {
        auth,
        registry,
        policy: Arc::new(RoutePolicy::default()),
        external_url: "http://depot.test".to_owned(),
        backend_kind: "memory",
        missing_config: Arc::new(Vec::new()),
    }
}

fn build_app(state: AppState) -> axum::Router {
    depot_server::api::router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_upload(uri: &str, token: Option<&str>, filename: &str, payload: &str) -> Request<Body> {
    let boundary = "depot-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/pdf\r\n\r\n\
         {payload}\r\n\
         --{boundary}--\r\n"
    );
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"));
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register an account and open a session, returning the bearer token.
async fn signup_and_login(app: &axum::Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/auth/signup",
            &serde_json::json!({ "email": email, "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/auth/login",
            &serde_json::json!({ "email": email, "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_owned()
}

// -- Health & probe -------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let app = build_app(build_test_state());
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn connection_test_reports_configured_memory_backend() {
    let app = build_app(build_test_state());
    let response = app.oneshot(get("/test-connection")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["configured"], true);
    assert_eq!(body["reachable"], true);
}

// -- Access gate ----------------------------------------------------------

#[tokio::test]
async fn dashboard_without_session_redirects_to_login() {
    let app = build_app(build_test_state());
    let response = app.oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/login");
}

#[tokio::test]
async fn upload_page_without_session_redirects_to_login() {
    let app = build_app(build_test_state());
    let response = app.oneshot(get("/upload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/login");
}

#[tokio::test]
async fn login_page_with_session_redirects_to_dashboard() {
    let app = build_app(build_test_state());
    let token = signup_and_login(&app, "u1@example.com").await;

    let response = app.oneshot(get_authed("/login", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/dashboard");
}

#[tokio::test]
async fn home_is_allowed_for_any_session_state() {
    let app = build_app(build_test_state());

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let token = signup_and_login(&app, "u1@example.com").await;
    let response = app.oneshot(get_authed("/", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn session_cookie_also_satisfies_the_gate() {
    let app = build_app(build_test_state());
    let token = signup_and_login(&app, "u1@example.com").await;

    let request = Request::builder()
        .uri("/dashboard")
        .header("cookie", format!("depot_session={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Auth API -------------------------------------------------------------

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = build_app(build_test_state());
    signup_and_login(&app, "u1@example.com").await;

    let response = app
        .oneshot(post_json(
            "/v1/auth/signup",
            &serde_json::json!({ "email": "u1@example.com", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = build_app(build_test_state());
    signup_and_login(&app, "u1@example.com").await;

    let response = app
        .oneshot(post_json(
            "/v1/auth/login",
            &serde_json::json!({ "email": "u1@example.com", "password": "nope" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sets_the_session_cookie() {
    let app = build_app(build_test_state());
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/auth/signup",
            &serde_json::json!({ "email": "u1@example.com", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json(
            "/v1/auth/login",
            &serde_json::json!({ "email": "u1@example.com", "password": "pw" }),
        ))
        .await
        .unwrap();
    let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_owned();
    assert!(cookie.starts_with("depot_session="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = build_app(build_test_state());
    let token = signup_and_login(&app, "u1@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/logout")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_authed("/v1/auth/session", &token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["user"].is_null());
}

#[tokio::test]
async fn session_endpoint_reflects_presence() {
    let app = build_app(build_test_state());

    let response = app.clone().oneshot(get("/v1/auth/session")).await.unwrap();
    let body = body_json(response).await;
    assert!(body["user"].is_null());

    let token = signup_and_login(&app, "u1@example.com").await;
    let response = app
        .oneshot(get_authed("/v1/auth/session", &token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "u1@example.com");
}

// -- Files API ------------------------------------------------------------

#[tokio::test]
async fn upload_requires_authentication() {
    let app = build_app(build_test_state());
    let response = app
        .oneshot(multipart_upload("/v1/files", None, "report.pdf", "content"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_without_file_part_is_rejected() {
    let app = build_app(build_test_state());
    let token = signup_and_login(&app, "u1@example.com").await;

    let boundary = "depot-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/v1/files")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_then_list_shows_the_record() {
    let app = build_app(build_test_state());
    let token = signup_and_login(&app, "u1@example.com").await;

    let response = app
        .clone()
        .oneshot(multipart_upload("/v1/files", Some(&token), "report.pdf", "pdf bytes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded = body_json(response).await;
    assert_eq!(uploaded["name"], "report.pdf");
    assert_eq!(uploaded["downloads"], 0);
    let key = uploaded["key"].as_str().unwrap().to_owned();
    assert_eq!(
        uploaded["share_link"],
        format!("http://depot.test/download/{key}")
    );

    let response = app.oneshot(get_authed("/v1/files", &token)).await.unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["key"], key.as_str());
}

#[tokio::test]
async fn shared_metadata_is_public_and_unknown_keys_are_distinct_not_found() {
    let app = build_app(build_test_state());
    let token = signup_and_login(&app, "u1@example.com").await;

    let response = app
        .clone()
        .oneshot(multipart_upload("/v1/files", Some(&token), "notes.txt", "text"))
        .await
        .unwrap();
    let uploaded = body_json(response).await;
    let key = uploaded["key"].as_str().unwrap().to_owned();

    // Anonymous resolve succeeds.
    let response = app
        .clone()
        .oneshot(get(&format!("/v1/shared/{key}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let shared = body_json(response).await;
    assert_eq!(shared["name"], "notes.txt");

    // Unknown key renders the dedicated not-found state.
    let response = app
        .oneshot(get("/v1/shared/AAAAAAAAAA"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "file_not_found");
}

#[tokio::test]
async fn delete_is_idempotent_at_the_http_surface() {
    let app = build_app(build_test_state());
    let token = signup_and_login(&app, "u1@example.com").await;

    let response = app
        .clone()
        .oneshot(multipart_upload("/v1/files", Some(&token), "gone.txt", "x"))
        .await
        .unwrap();
    let uploaded = body_json(response).await;
    let id = uploaded["id"].as_str().unwrap().to_owned();
    let key = uploaded["key"].as_str().unwrap().to_owned();

    let delete_request = |app: &axum::Router| {
        app.clone().oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/v1/files/{id}"))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
    };

    let response = delete_request(&app).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The record is gone.
    let response = app
        .clone()
        .oneshot(get(&format!("/v1/shared/{key}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Second delete does not raise an error.
    let response = delete_request(&app).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// -- Download surface -----------------------------------------------------

#[tokio::test]
async fn end_to_end_share_scenario() {
    let app = build_app(build_test_state());
    let token = signup_and_login(&app, "u1@example.com").await;

    // U1 uploads report.pdf.
    let payload = "pdf payload bytes";
    let response = app
        .clone()
        .oneshot(multipart_upload("/upload", Some(&token), "report.pdf", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded = body_json(response).await;
    let key = uploaded["key"].as_str().unwrap().to_owned();
    assert_eq!(uploaded["downloads"], 0);
    assert_eq!(uploaded["size"], payload.len() as u64);

    // An anonymous recipient follows the share link.
    let response = app
        .clone()
        .oneshot(get(&format!("/download/{key}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "attachment; filename=\"report.pdf\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), payload.as_bytes());

    // The owner's listing now shows one download.
    let response = app.oneshot(get_authed("/v1/files", &token)).await.unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed[0]["downloads"], 1);
}

#[tokio::test]
async fn download_of_unknown_key_is_the_distinct_not_found_state() {
    let app = build_app(build_test_state());

    let response = app
        .clone()
        .oneshot(get("/download/AAAAAAAAAA"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "file_not_found");

    // Malformed keys render the same state, not a different error.
    let response = app.oneshot(get("/download/way-too-long-key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Gate fail-open -------------------------------------------------------

mod failing_backend {
    use async_trait::async_trait;
    use tokio::sync::broadcast;

    use depot_backend::auth::{AuthBackend, SessionToken};
    use depot_backend::error::BackendError;
    use depot_core::session::{Identity, SessionEvent};

    /// Auth backend whose every call fails with a connection error.
    pub struct DownAuth {
        events: broadcast::Sender<SessionEvent>,
    }

    impl DownAuth {
        pub fn new() -> Self {
            let (events, _) = broadcast::channel(8);
            Self { events }
        }
    }

    #[async_trait]
    impl AuthBackend for DownAuth {
        async fn sign_up(&self, _: &str, _: &str) -> Result<Identity, BackendError> {
            Err(BackendError::Connection("backend down".to_owned()))
        }

        async fn sign_in(
            &self,
            _: &str,
            _: &str,
        ) -> Result<(SessionToken, Identity), BackendError> {
            Err(BackendError::Connection("backend down".to_owned()))
        }

        async fn session(&self, _: &SessionToken) -> Result<Option<Identity>, BackendError> {
            Err(BackendError::Connection("backend down".to_owned()))
        }

        async fn sign_out(&self, _: &SessionToken) -> Result<(), BackendError> {
            Err(BackendError::Connection("backend down".to_owned()))
        }

        fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
            self.events.subscribe()
        }
    }
}

#[tokio::test]
async fn gate_fails_open_to_logged_out_when_backend_is_down() {
    let mut state = build_test_state();
    state.auth = Arc::new(failing_backend::DownAuth::new());
    let app = build_app(state);

    // A protected page behaves as if the caller were logged out.
    let response = app
        .clone()
        .oneshot(get_authed("/dashboard", "some-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/login");

    // Public pages still render.
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
