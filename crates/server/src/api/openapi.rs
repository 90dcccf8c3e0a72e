use utoipa::OpenApi;

use super::schemas::{
    ConnectionTestResponse, ErrorResponse, FileResponse, HealthResponse, LoginRequest,
    LoginResponse, SessionResponse, SharedFileResponse, SignupRequest, UserResponse,
};

/// OpenAPI document for the Depot HTTP API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Depot",
        description = "File-sharing gateway: upload files, share capability links, download by key."
    ),
    paths(
        super::health::health,
        super::pages::test_connection,
        super::auth::signup,
        super::auth::login,
        super::auth::logout,
        super::auth::session,
        super::files::upload,
        super::files::list,
        super::files::delete_file,
        super::files::resolve,
        super::download::download,
    ),
    components(schemas(
        ConnectionTestResponse,
        ErrorResponse,
        FileResponse,
        HealthResponse,
        LoginRequest,
        LoginResponse,
        SessionResponse,
        SharedFileResponse,
        SignupRequest,
        UserResponse,
    )),
    tags(
        (name = "Auth", description = "Accounts and sessions"),
        (name = "Files", description = "File registry operations"),
        (name = "Download", description = "Capability-URL downloads"),
        (name = "Health", description = "Liveness and connectivity")
    )
)]
pub struct ApiDoc;
