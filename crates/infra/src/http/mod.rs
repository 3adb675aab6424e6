//! HTTP transport: request descriptors, multipart forms and the
//! single-attempt client that sends them.

pub mod client;
pub mod form;
pub mod request;

pub use client::{HttpClient, HttpClientBuilder, HttpResponse};
pub use form::{FormData, FormPart};
pub use request::{
    append_query, build_headers, join_url, ApiRequest, CacheMode, Endpoints, HttpMethod,
    PreparedBody, PreparedRequest, QueryValue, RequestBody, RequestOptions,
};
