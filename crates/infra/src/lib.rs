//! # Bookstore Infrastructure
//!
//! Everything in the bookstore client that performs I/O.
//!
//! This crate contains:
//! - The HTTP transport and request descriptors
//! - The resilient API client with shared token refresh
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Builds on the types in `bookstore-domain`
//! - Contains all "impure" code (network, environment, files)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiError, AuthApi, Outcome, SessionStore};
pub use http::{ApiRequest, CacheMode, FormData, HttpMethod, RequestBody, RequestOptions};
