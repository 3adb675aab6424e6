//! Resilient API client
//!
//! Every call is sent once. A 401 is never handed straight to the caller:
//! the client refreshes the session through the local refresh route (one
//! refresh at a time, shared by every request that hit the 401) and then
//! replays the original request exactly once. Any other failure status is
//! returned immediately.

use std::sync::Arc;
use std::time::Duration;

use bookstore_domain::{ApiEnvelope, AuthConfig, Config, TokenPair};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::errors::ApiError;
use super::failure::{handler_for, LoggingNavigator, Navigator, RefreshFailureHandler};
use super::refresh::{RefreshCoordinator, RefreshResult};
use super::session::SessionStore;
use crate::http::{
    ApiRequest, Endpoints, HttpClient, HttpMethod, HttpResponse, PreparedRequest, RequestBody,
    RequestOptions,
};
use crate::observability::{ClientMetrics, MetricsSnapshot};

/// Status and parsed body of a successful call
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: u16,
    /// Parsed JSON body; `Value::Null` when the response had no body
    pub payload: Value,
}

impl Outcome {
    /// Decode the whole payload.
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.payload).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Decode the `data` member of the backend envelope.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        self.into_payload::<ApiEnvelope<T>>().map(|envelope| envelope.data)
    }
}

/// API client with single-flight token refresh
///
/// Cheap to clone; clones share the cookie store, session, refresh slot and
/// metrics.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    endpoints: Endpoints,
    auth: AuthConfig,
    session: SessionStore,
    coordinator: RefreshCoordinator,
    failure_handler: Arc<dyn RefreshFailureHandler>,
    metrics: Arc<ClientMetrics>,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Client with defaults for everything but the configuration.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the HTTP transport cannot be built.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        Self::builder().config(config).build()
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Outcome, ApiError> {
        self.send(ApiRequest::new(HttpMethod::Get, path).with_options(options)).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Outcome, ApiError> {
        self.send(ApiRequest::new(HttpMethod::Post, path).with_body(body).with_options(options))
            .await
    }

    pub async fn put(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Outcome, ApiError> {
        self.send(ApiRequest::new(HttpMethod::Put, path).with_body(body).with_options(options))
            .await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Outcome, ApiError> {
        self.send(ApiRequest::new(HttpMethod::Patch, path).with_body(body).with_options(options))
            .await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<Outcome, ApiError> {
        self.send(ApiRequest::new(HttpMethod::Delete, path).with_options(options)).await
    }

    /// Send a request, recovering from one expired session on the way.
    ///
    /// # Errors
    /// - `ApiError::Entity` for a 422
    /// - `ApiError::Http` for any other non-2xx status except 401
    /// - `ApiError::SessionExpired` / `ApiError::LoginRedirect` when the
    ///   session could not be refreshed
    /// - `ApiError::Unauthorized` when the replay is rejected as well
    /// - `ApiError::Unexpected` when the refresh call itself failed
    /// - `ApiError::NotJson` / `ApiError::Decode` for unusable bodies
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ApiRequest) -> Result<Outcome, ApiError> {
        let prepared = PreparedRequest::from_request(&request, &self.inner.endpoints)?;

        let response = self.dispatch(&prepared).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return classify(&response);
        }

        debug!("request unauthorized, refreshing session");
        self.refresh().await?;

        self.inner.metrics.record_replay();
        let replay = self.dispatch(&prepared).await?;
        if replay.status == StatusCode::UNAUTHORIZED {
            warn!("replayed request unauthorized after refresh");
            return Err(ApiError::Unauthorized { payload: parse_payload(&replay).unwrap_or_default() });
        }

        classify(&replay)
    }

    /// Refresh the session now, joining a refresh already in flight.
    ///
    /// # Errors
    /// Same refresh-related errors as [`ApiClient::send`].
    pub async fn refresh(&self) -> RefreshResult {
        let inner = Arc::clone(&self.inner);
        self.inner.coordinator.refresh_with(move || async move { inner.run_refresh().await }).await
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.inner.auth
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Whether a token refresh is in flight right now
    pub fn is_refreshing(&self) -> bool {
        self.inner.coordinator.is_refreshing()
    }

    async fn dispatch(&self, prepared: &PreparedRequest) -> Result<HttpResponse, ApiError> {
        let bearer = self.inner.session.access_token().await;
        self.inner.metrics.record_request();
        Ok(self.inner.http.send(prepared, bearer.as_deref()).await?)
    }
}

impl ClientInner {
    /// Body of the shared refresh future. Runs once per refresh.
    async fn run_refresh(&self) -> RefreshResult {
        let tokens = match self.request_tokens().await {
            Ok(Some(tokens)) => tokens,
            Ok(None) => {
                self.metrics.record_refresh_failure();
                warn!("refresh rejected, session is gone");
                self.session.clear().await;
                return Err(self.failure_handler.on_refresh_failed().await);
            }
            Err(err) => {
                self.metrics.record_refresh_failure();
                warn!(error = %err, "token refresh failed");
                return Err(ApiError::unexpected(err.to_string()));
            }
        };

        self.session.store(tokens.clone()).await;
        self.failure_handler.persist_session(&tokens).await?;
        info!("access token refreshed");
        Ok(tokens)
    }

    /// Call the refresh route. `Ok(None)` means the backend rejected the
    /// session; `Err` means the call itself did not work.
    async fn request_tokens(&self) -> Result<Option<TokenPair>, ApiError> {
        let mut request = ApiRequest::new(HttpMethod::Post, self.auth.refresh_path.as_str())
            .with_options(RequestOptions::new().same_origin());
        if let Some(refresh_token) = self.session.refresh_token().await {
            request = request.with_body(json!({ "refreshToken": refresh_token }));
        }
        let prepared = PreparedRequest::from_request(&request, &self.endpoints)?;

        let response = self.http.send(&prepared, None).await?;
        if !response.status.is_success() {
            debug!(status = %response.status, "refresh route rejected the session");
            return Ok(None);
        }

        let envelope: ApiEnvelope<Option<TokenPair>> =
            serde_json::from_value(parse_payload(&response)?)
                .map_err(|e| ApiError::Decode(format!("refresh response: {e}")))?;
        if !envelope.success {
            return Ok(None);
        }

        envelope
            .data
            .map(Some)
            .ok_or_else(|| ApiError::Decode("refresh response carried no token".to_string()))
    }
}

/// Turn a non-401 response into the caller's result.
fn classify(response: &HttpResponse) -> Result<Outcome, ApiError> {
    let payload = parse_payload(response)?;
    let status = response.status.as_u16();

    if response.status.is_success() {
        Ok(Outcome { status, payload })
    } else {
        Err(ApiError::from_status(status, response.status_text(), payload))
    }
}

/// Parse a response body as JSON.
///
/// An empty body parses to `null`; a body under a non-JSON content type is
/// rejected without being parsed.
fn parse_payload(response: &HttpResponse) -> Result<Value, ApiError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    if !response.is_json() {
        return Err(ApiError::NotJson {
            status: response.status.as_u16(),
            content_type: response.content_type().map(str::to_string),
        });
    }
    serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<Config>,
    http_client: Option<HttpClient>,
    session: Option<SessionStore>,
    navigator: Option<Arc<dyn Navigator>>,
    failure_handler: Option<Arc<dyn RefreshFailureHandler>>,
}

impl ApiClientBuilder {
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing transport instead of building one from the config
    #[must_use]
    pub fn http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Start from an existing session, e.g. tokens read from a cookie
    #[must_use]
    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Navigator used by the interactive failure handler
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replace the environment's default failure handler
    #[must_use]
    pub fn failure_handler(mut self, handler: Arc<dyn RefreshFailureHandler>) -> Self {
        self.failure_handler = Some(handler);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the HTTP transport cannot be built.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let endpoints = Endpoints::new(&config.api.public_endpoint, &config.api.local_origin);

        let http = match self.http_client {
            Some(http) => http,
            None => HttpClient::builder()
                .timeout(Duration::from_secs(config.api.timeout_secs))
                .user_agent(config.api.user_agent.as_str())
                .build()
                .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?,
        };

        let failure_handler = match self.failure_handler {
            Some(handler) => handler,
            None => handler_for(
                config.api.environment,
                &config.auth,
                &http,
                &endpoints,
                self.navigator.unwrap_or_else(|| Arc::new(LoggingNavigator)),
            ),
        };

        let metrics = Arc::new(ClientMetrics::new());
        debug!(
            public_endpoint = %endpoints.public_endpoint(),
            local_origin = %endpoints.local_origin(),
            environment = %config.api.environment,
            "API client created"
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                endpoints,
                auth: config.auth,
                session: self.session.unwrap_or_default(),
                coordinator: RefreshCoordinator::new(Arc::clone(&metrics)),
                failure_handler,
                metrics,
            }),
        })
    }
}
