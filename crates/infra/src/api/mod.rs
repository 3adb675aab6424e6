//! Resilient client for the bookstore backend
//!
//! # Architecture
//!
//! - `client`: request execution, response classification, 401 recovery
//! - `refresh`: single-flight coordination of the token refresh
//! - `failure`: interactive and headless handling of a lost session
//! - `session`: current token pair, shared by every clone of the client
//! - `feedback`: routing of errors to form fields or toasts
//! - `auth`: login, logout and explicit refresh over the local routes

pub mod auth;
pub mod client;
pub mod errors;
pub mod failure;
pub mod feedback;
pub mod refresh;
pub mod session;

pub use auth::{AuthApi, LoginRequest};
pub use client::{ApiClient, ApiClientBuilder, Outcome};
pub use errors::{ApiError, ApiErrorCategory};
pub use failure::{
    HeadlessFailureHandler, InteractiveFailureHandler, LoggingNavigator, Navigator,
    RefreshFailureHandler,
};
pub use feedback::{route_error, Feedback, FeedbackSink};
pub use refresh::{RefreshCoordinator, RefreshResult};
pub use session::SessionStore;
