//! What happens around a token refresh, per host environment
//!
//! An interactive client sends the user to the login page when the session
//! cannot be recovered. A headless client has nobody to redirect, so it
//! surfaces [`ApiError::SessionExpired`] to whatever issued the request, and
//! after a successful refresh it writes the new token into the local session
//! route so the caller's session keeps it.

use std::sync::Arc;

use async_trait::async_trait;
use bookstore_domain::{AuthConfig, ClientEnvironment, TokenPair};
use tracing::{debug, warn};

use super::errors::ApiError;
use crate::http::{
    ApiRequest, Endpoints, HttpClient, HttpMethod, PreparedRequest, RequestBody, RequestOptions,
};

/// Environment-specific hooks run inside the shared refresh.
///
/// Both hooks run once per refresh, no matter how many requests are waiting
/// on it.
#[async_trait]
pub trait RefreshFailureHandler: Send + Sync {
    /// Called after a successful refresh, before any request is replayed.
    async fn persist_session(&self, _tokens: &TokenPair) -> Result<(), ApiError> {
        Ok(())
    }

    /// Called when the refresh endpoint rejected the session. The returned
    /// error is what every waiting request fails with.
    async fn on_refresh_failed(&self) -> ApiError;
}

/// Moves the user to another page
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

/// Navigator for hosts without a UI hook: records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, location: &str) {
        warn!(%location, "session expired, redirecting to login");
    }
}

pub struct InteractiveFailureHandler {
    navigator: Arc<dyn Navigator>,
    login_page: String,
}

impl InteractiveFailureHandler {
    pub fn new(navigator: Arc<dyn Navigator>, login_page: impl Into<String>) -> Self {
        Self { navigator, login_page: login_page.into() }
    }
}

#[async_trait]
impl RefreshFailureHandler for InteractiveFailureHandler {
    async fn on_refresh_failed(&self) -> ApiError {
        self.navigator.navigate(&self.login_page);
        ApiError::LoginRedirect { location: self.login_page.clone() }
    }
}

pub struct HeadlessFailureHandler {
    http: HttpClient,
    endpoints: Endpoints,
    session_path: String,
}

impl HeadlessFailureHandler {
    pub fn new(http: HttpClient, endpoints: Endpoints, session_path: impl Into<String>) -> Self {
        Self { http, endpoints, session_path: session_path.into() }
    }
}

#[async_trait]
impl RefreshFailureHandler for HeadlessFailureHandler {
    async fn persist_session(&self, tokens: &TokenPair) -> Result<(), ApiError> {
        let request = ApiRequest::new(HttpMethod::Post, self.session_path.as_str())
            .with_body(RequestBody::json(tokens)?)
            .with_options(RequestOptions::new().same_origin());
        let prepared = PreparedRequest::from_request(&request, &self.endpoints)?;

        let response = self.http.send(&prepared, None).await?;
        if !response.status.is_success() {
            return Err(ApiError::unexpected(format!(
                "session route answered {} while storing the refreshed token",
                response.status
            )));
        }

        debug!("refreshed token stored in local session");
        Ok(())
    }

    async fn on_refresh_failed(&self) -> ApiError {
        ApiError::SessionExpired
    }
}

/// Pick the handler for `environment`.
pub fn handler_for(
    environment: ClientEnvironment,
    auth: &AuthConfig,
    http: &HttpClient,
    endpoints: &Endpoints,
    navigator: Arc<dyn Navigator>,
) -> Arc<dyn RefreshFailureHandler> {
    match environment {
        ClientEnvironment::Interactive => {
            Arc::new(InteractiveFailureHandler::new(navigator, auth.login_page.as_str()))
        }
        ClientEnvironment::Headless => Arc::new(HeadlessFailureHandler::new(
            http.clone(),
            endpoints.clone(),
            auth.session_path.as_str(),
        )),
    }
}
