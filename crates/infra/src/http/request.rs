//! Request descriptors and their translation into concrete HTTP requests
//!
//! An [`ApiRequest`] is what callers describe: a method, a path relative to
//! some base URL, optional body and options. [`PreparedRequest`] is the
//! resolved form the transport can send any number of times, which is what
//! makes the refresh-and-replay path possible without the caller rebuilding
//! anything.

use bookstore_domain::BookstoreError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::form::FormData;
use crate::errors::InfraError;

/// Methods the backend API accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// Value of one query parameter
///
/// `Many` expands to repeated `key=value` pairs; `Absent` is dropped from
/// the query string entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Absent,
    One(String),
    Many(Vec<String>),
}

macro_rules! impl_scalar_query_value {
    ($($ty:ty),+ $(,)?) => {
        $(impl From<$ty> for QueryValue {
            fn from(value: $ty) -> Self {
                Self::One(value.to_string())
            }
        })+
    };
}

impl_scalar_query_value!(&str, String, bool, i32, i64, u32, u64, usize, f64);

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for QueryValue {
    fn from(values: [T; N]) -> Self {
        Self::Many(values.iter().map(ToString::to_string).collect())
    }
}

impl From<Value> for QueryValue {
    fn from(value: Value) -> Self {
        fn scalar(value: Value) -> Option<String> {
            match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            }
        }

        match value {
            Value::Null => Self::Absent,
            Value::Array(items) => Self::Many(items.into_iter().filter_map(scalar).collect()),
            other => scalar(other).map_or(Self::Absent, Self::One),
        }
    }
}

/// Cache directive forwarded to the server as `Cache-Control`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    #[default]
    Default,
    NoStore,
    NoCache,
}

impl CacheMode {
    fn header_value(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::NoStore => Some("no-store"),
            Self::NoCache => Some("no-cache"),
        }
    }
}

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`
    Json(Value),
    /// Sent as `multipart/form-data`; the transport picks the boundary
    Form(FormData),
}

impl RequestBody {
    /// Serialize any value into a JSON body.
    ///
    /// # Errors
    /// Returns `BookstoreError::InvalidInput` if the value cannot be
    /// represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, BookstoreError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| BookstoreError::InvalidInput(format!("Failed to serialize body: {e}")))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<FormData> for RequestBody {
    fn from(form: FormData) -> Self {
        Self::Form(form)
    }
}

/// Per-call options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// `None` targets the public API, `Some("")` the local origin, anything
    /// else is used verbatim
    pub base_url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, QueryValue)>,
    pub cache: CacheMode,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Target the local server's own route handlers.
    #[must_use]
    pub fn same_origin(self) -> Self {
        self.base_url("")
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }
}

/// A request as described by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<RequestBody>,
    pub options: RequestOptions,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, options: RequestOptions::default() }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// The two base URLs a request can be resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    public_endpoint: String,
    local_origin: String,
}

impl Endpoints {
    pub fn new(public_endpoint: &str, local_origin: &str) -> Self {
        Self {
            public_endpoint: public_endpoint.trim_end_matches('/').to_string(),
            local_origin: local_origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_endpoint(&self) -> &str {
        &self.public_endpoint
    }

    pub fn local_origin(&self) -> &str {
        &self.local_origin
    }

    /// Pick the base URL for a request's override.
    pub fn resolve_base<'a>(&'a self, base_override: Option<&'a str>) -> &'a str {
        match base_override {
            None => &self.public_endpoint,
            Some("") => &self.local_origin,
            Some(base) => base,
        }
    }
}

/// Join a base URL and a path, adding a separator only when the path lacks
/// a leading slash.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Append query parameters, expanding lists into repeated pairs.
pub fn append_query(url: &mut Url, params: &[(String, QueryValue)]) {
    let has_values = params.iter().any(|(_, value)| match value {
        QueryValue::Absent => false,
        QueryValue::One(_) => true,
        QueryValue::Many(values) => !values.is_empty(),
    });
    if !has_values {
        return;
    }

    let mut pairs = url.query_pairs_mut();
    for (key, value) in params {
        match value {
            QueryValue::Absent => {}
            QueryValue::One(value) => {
                pairs.append_pair(key, value);
            }
            QueryValue::Many(values) => {
                for value in values {
                    pairs.append_pair(key, value);
                }
            }
        }
    }
}

/// Body in the form the transport sends it
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedBody {
    Empty,
    Json(Vec<u8>),
    Form(FormData),
}

/// Fully resolved request, replayable any number of times
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: PreparedBody,
}

impl PreparedRequest {
    /// Resolve a caller request against the configured endpoints.
    ///
    /// # Errors
    /// Returns `BookstoreError::InvalidInput` if the URL or a header is
    /// malformed, or the body cannot be serialized.
    pub fn from_request(request: &ApiRequest, endpoints: &Endpoints) -> Result<Self, InfraError> {
        let base = endpoints.resolve_base(request.options.base_url.as_deref());
        let mut url = Url::parse(&join_url(base, &request.path))?;
        append_query(&mut url, &request.options.params);

        let headers = build_headers(&request.options, request.body.as_ref())?;

        let body = match &request.body {
            None => PreparedBody::Empty,
            Some(RequestBody::Json(value)) => {
                PreparedBody::Json(serde_json::to_vec(value).map_err(|e| {
                    BookstoreError::InvalidInput(format!("Failed to serialize body: {e}"))
                })?)
            }
            Some(RequestBody::Form(form)) => PreparedBody::Form(form.clone()),
        };

        Ok(Self { method: request.method, url, headers, body })
    }
}

/// Build the header map for a request.
///
/// JSON requests get `Content-Type: application/json` unless the caller
/// overrides it. Form bodies never carry an explicit content type, not even
/// one supplied by the caller, so the transport's multipart boundary is the
/// only one on the wire.
pub fn build_headers(
    options: &RequestOptions,
    body: Option<&RequestBody>,
) -> Result<HeaderMap, InfraError> {
    let is_form = matches!(body, Some(RequestBody::Form(_)));
    let mut headers = HeaderMap::new();

    if !is_form {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    if let Some(directive) = options.cache.header_value() {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(directive));
    }

    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            BookstoreError::InvalidInput(format!("invalid header name '{name}': {e}"))
        })?;
        if is_form && name == CONTENT_TYPE {
            continue;
        }
        let value = HeaderValue::from_str(value).map_err(|e| {
            BookstoreError::InvalidInput(format!("invalid value for header '{name}': {e}"))
        })?;
        headers.insert(name, value);
    }

    Ok(headers)
}
