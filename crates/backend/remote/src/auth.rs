use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::broadcast;

use depot_backend::auth::{AuthBackend, SessionToken};
use depot_backend::error::BackendError;
use depot_core::session::{Identity, SessionEvent};

use crate::wire::{TokenResponse, UserResponse};
use crate::{RemoteBackend, transport_error};

#[async_trait]
impl AuthBackend for RemoteBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, BackendError> {
        let url = self.endpoint("/auth/v1/signup")?;
        let response = self
            .with_keys(self.http.post(url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            status if status.is_success() => {
                let user: UserResponse =
                    response.json().await.map_err(|e| transport_error(&e))?;
                Ok(user.into())
            }
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Err(
                BackendError::Conflict(format!("account already registered: {email}")),
            ),
            status => Err(BackendError::Backend(format!("signup failed: {status}"))),
        }
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SessionToken, Identity), BackendError> {
        let url = self.endpoint("/auth/v1/token?grant_type=password")?;
        let response = self
            .with_keys(self.http.post(url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            status if status.is_success() => {
                let body: TokenResponse =
                    response.json().await.map_err(|e| transport_error(&e))?;
                let identity: Identity = body.user.into();
                self.emit(SessionEvent::SignedIn(identity.clone()));
                Ok((SessionToken::new(body.access_token), identity))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(BackendError::InvalidCredentials)
            }
            status => Err(BackendError::Backend(format!("sign-in failed: {status}"))),
        }
    }

    async fn session(&self, token: &SessionToken) -> Result<Option<Identity>, BackendError> {
        let url = self.endpoint("/auth/v1/user")?;
        let response = self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            status if status.is_success() => {
                let user: UserResponse =
                    response.json().await.map_err(|e| transport_error(&e))?;
                Ok(Some(user.into()))
            }
            // An expired or revoked token is an absent session, not a fault.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(BackendError::Backend(format!(
                "session lookup failed: {status}"
            ))),
        }
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), BackendError> {
        let url = self.endpoint("/auth/v1/logout")?;
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            // Already-dead tokens are fine; sign-out is idempotent.
            status if status.is_success() => {
                self.emit(SessionEvent::SignedOut);
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(()),
            status => Err(BackendError::Backend(format!("sign-out failed: {status}"))),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.subscribe_events()
    }
}
