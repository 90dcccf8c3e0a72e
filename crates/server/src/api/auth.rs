use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::gate::{CurrentSession, SESSION_COOKIE, extract_token};

use super::AppState;
use super::schemas::{
    ErrorResponse, LoginRequest, LoginResponse, SessionResponse, SignupRequest, UserResponse,
};

use axum::Extension;

/// `POST /v1/auth/signup` -- register a new account.
#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    tag = "Auth",
    summary = "Sign up",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Response, ServerError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(ServerError::BadRequest(
            "email and password are required".to_owned(),
        ));
    }

    let identity = state.auth.sign_up(&body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&identity))).into_response())
}

/// `POST /v1/auth/login` -- authenticate and open a session.
///
/// The issued token is returned in the body and also set as the HttpOnly
/// session cookie so the page surface picks it up.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    summary = "Login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ServerError> {
    let (token, identity) = state.auth.sign_in(&body.email, &body.password).await?;

    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        token.as_str()
    );
    let body = LoginResponse {
        token: token.as_str().to_owned(),
        user: UserResponse::from(&identity),
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// `POST /v1/auth/logout` -- revoke the current session token.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    summary = "Logout",
    responses(
        (status = 200, description = "Session closed"),
        (status = 401, description = "No session credential presented", body = ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let Some(token) = extract_token(&headers) else {
        return Err(ServerError::Unauthorized(
            "no session credential presented".to_owned(),
        ));
    };

    state.auth.sign_out(&token).await?;

    // Expire the cookie regardless of where the token came from.
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    Ok(([(SET_COOKIE, cookie)], StatusCode::OK).into_response())
}

/// `GET /v1/auth/session` -- the identity for the presented credential.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    tag = "Auth",
    summary = "Current session",
    responses(
        (status = 200, description = "Session state", body = SessionResponse)
    )
)]
pub async fn session(Extension(current): Extension<CurrentSession>) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: current.0.as_ref().map(UserResponse::from),
    })
}
