use std::time::Duration;

use bookstore_domain::constants::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use bookstore_domain::BookstoreError;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::debug;

use super::request::{PreparedBody, PreparedRequest};
use crate::errors::InfraError;

/// Raw HTTP response, fully buffered
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown Status")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }

    /// Whether the declared content type is JSON (`application/json` or any
    /// `+json` suffix type).
    pub fn is_json(&self) -> bool {
        self.content_type().is_some_and(|value| {
            let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
    }
}

/// Single-attempt HTTP transport.
///
/// Cookies are kept in a client-wide store and sent on every request, so a
/// session established through one call is carried by the next. No retries
/// happen here; the API layer decides when a request is worth replaying.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, BookstoreError> {
        Self::builder().build()
    }

    /// Send a prepared request once and buffer the response.
    ///
    /// `bearer` is attached as an `Authorization` header unless the request
    /// already carries one.
    pub async fn send(
        &self,
        prepared: &PreparedRequest,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, BookstoreError> {
        let mut builder = self
            .client
            .request(prepared.method.as_reqwest(), prepared.url.clone())
            .headers(prepared.headers.clone());

        if let Some(token) = bearer {
            if !prepared.headers.contains_key(AUTHORIZATION) {
                builder = builder.bearer_auth(token);
            }
        }

        builder = match &prepared.body {
            PreparedBody::Empty => builder,
            PreparedBody::Json(bytes) => builder.body(bytes.clone()),
            PreparedBody::Form(form) => {
                builder.multipart(form.to_multipart().map_err(BookstoreError::from)?)
            }
        };

        let method = prepared.method;
        let url = &prepared.url;
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(builder.build().map_err(to_domain)?).await.map_err(
            |err| {
                debug!(%method, %url, error = %err, "HTTP request failed");
                to_domain(err)
            },
        )?;

        let status = response.status();
        let headers = response.headers().clone();
        debug!(%method, %url, %status, "received HTTP response");

        let body = response.bytes().await.map_err(to_domain)?.to_vec();
        Ok(HttpResponse { status, headers, body })
    }
}

fn to_domain(err: reqwest::Error) -> BookstoreError {
    InfraError::from(err).into()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    cookie_store: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            default_headers: None,
            cookie_store: true,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Keep and resend cookies across requests (on by default).
    pub fn cookie_store(mut self, enabled: bool) -> Self {
        self.cookie_store = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, BookstoreError> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .cookie_store(self.cookie_store)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(to_domain)?;

        Ok(HttpClient { client })
    }
}
