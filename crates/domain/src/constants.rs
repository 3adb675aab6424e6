//! Application constants
//!
//! Centralized location for the defaults the API client falls back to when
//! configuration leaves a value out.

// Endpoints
pub const DEFAULT_PUBLIC_ENDPOINT: &str = "http://localhost:4000/api/v1";
pub const DEFAULT_LOCAL_ORIGIN: &str = "http://localhost:3000";

// Same-origin route handlers
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh-token";
pub const DEFAULT_SESSION_PATH: &str = "/api/auth/token";
pub const DEFAULT_LOGIN_PATH: &str = "/api/auth/login";
pub const DEFAULT_LOGOUT_PATH: &str = "/api/auth/logout";
pub const DEFAULT_LOGIN_PAGE: &str = "/login";

// Transport
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("bookstore-client/", env!("CARGO_PKG_VERSION"));

// Error reporting
pub const ENTITY_ERROR_STATUS: u16 = 422;
pub const AUTHENTICATION_ERROR_STATUS: u16 = 401;
pub const UNEXPECTED_ERROR_STATUS: u16 = 500;
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired, please sign in again";
