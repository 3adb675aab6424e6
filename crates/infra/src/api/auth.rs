//! Session lifecycle over the local auth routes
//!
//! Thin typed wrapper around [`ApiClient`]: login stores the issued tokens
//! in the client's session, logout clears them.

use bookstore_domain::TokenPair;
use serde::Serialize;
use tracing::{info, instrument};

use super::client::ApiClient;
use super::errors::ApiError;
use crate::http::{ApiRequest, HttpMethod, RequestBody, RequestOptions};

/// Credentials posted to the login route
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and keep the issued tokens for subsequent calls.
    ///
    /// # Errors
    /// `ApiError::Entity` for rejected credentials, or any transport error.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<TokenPair, ApiError> {
        let path = self.client.auth_config().login_path.clone();
        let tokens: TokenPair = self
            .client
            .post(&path, RequestBody::json(credentials)?, RequestOptions::new().same_origin())
            .await?
            .into_data()?;

        self.client.session().store(tokens.clone()).await;
        info!("signed in");
        Ok(tokens)
    }

    /// Sign out. The local session is cleared even if the route fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let path = self.client.auth_config().logout_path.clone();
        let request = ApiRequest::new(HttpMethod::Post, path)
            .with_options(RequestOptions::new().same_origin());
        let result = self.client.send(request).await;

        self.client.session().clear().await;
        result.map(|_| info!("signed out"))
    }

    /// Refresh now instead of waiting for a 401.
    pub async fn refresh_session(&self) -> Result<TokenPair, ApiError> {
        self.client.refresh().await
    }
}
