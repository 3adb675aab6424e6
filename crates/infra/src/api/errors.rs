//! API-specific error types
//!
//! Classifies failed calls the way callers need to react to them: field
//! validation, a lost session, a plain HTTP failure, or something the client
//! itself could not complete.

use bookstore_domain::constants::{
    AUTHENTICATION_ERROR_STATUS, ENTITY_ERROR_STATUS, SESSION_EXPIRED_MESSAGE,
    UNEXPECTED_ERROR_MESSAGE, UNEXPECTED_ERROR_STATUS,
};
use bookstore_domain::{BookstoreError, ErrorBody, FieldErrorDetail};
use serde_json::Value;
use thiserror::Error;

use crate::errors::InfraError;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 422 with field details - the caller fixes the input
    Validation,
    /// Session could not be recovered
    Authentication,
    /// Other 4xx responses
    Client,
    /// 5xx responses and unexpected client-side failures
    Server,
    /// Connection failures and timeouts
    Network,
    /// Response body was not the JSON the backend promises
    Decode,
    /// Malformed request or client configuration
    Config,
}

/// API operation errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// HTTP 422: request failed validation
    #[error("{message}")]
    Entity {
        message: String,
        error_code: Option<String>,
        status: u16,
        details: Vec<FieldErrorDetail>,
    },

    /// Any other non-2xx response except 401
    #[error("HTTP {status} {status_text}: {message}")]
    Http { status: u16, status_text: String, message: String, payload: Value },

    /// Refresh was rejected while running headless
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,

    /// Refresh was rejected while interactive; the user was sent to `location`
    #[error("Session expired, redirected to {location}")]
    LoginRedirect { location: String },

    /// The request was rejected again after a successful refresh
    #[error("Request still unauthorized after token refresh")]
    Unauthorized { payload: Value },

    /// The refresh attempt itself failed
    #[error("{}", UNEXPECTED_ERROR_MESSAGE)]
    Unexpected { cause: String },

    /// Response declared a non-JSON content type
    #[error(
        "Expected a JSON response (status {status}), got {}",
        .content_type.as_deref().unwrap_or("no content type")
    )]
    NotJson { status: u16, content_type: Option<String> },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn unexpected(cause: impl Into<String>) -> Self {
        Self::Unexpected { cause: cause.into() }
    }

    /// Build the error for a non-2xx, non-401 response.
    pub fn from_status(status: u16, status_text: &str, payload: Value) -> Self {
        let body = ErrorBody::from_payload(&payload);

        if status == ENTITY_ERROR_STATUS {
            return Self::Entity {
                message: body.message,
                error_code: body.error_code,
                status,
                details: body.details,
            };
        }

        Self::Http { status, status_text: status_text.to_string(), message: body.message, payload }
    }

    /// HTTP status the error corresponds to, when there is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Entity { status, .. } | Self::Http { status, .. } | Self::NotJson { status, .. } => {
                Some(*status)
            }
            Self::SessionExpired | Self::LoginRedirect { .. } | Self::Unauthorized { .. } => {
                Some(AUTHENTICATION_ERROR_STATUS)
            }
            Self::Unexpected { .. } => Some(UNEXPECTED_ERROR_STATUS),
            Self::Decode(_)
            | Self::Network(_)
            | Self::Timeout(_)
            | Self::InvalidInput(_)
            | Self::Config(_) => None,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Entity { .. } => ApiErrorCategory::Validation,
            Self::SessionExpired | Self::LoginRedirect { .. } | Self::Unauthorized { .. } => {
                ApiErrorCategory::Authentication
            }
            Self::Http { status, .. } if *status >= 500 => ApiErrorCategory::Server,
            Self::Http { .. } => ApiErrorCategory::Client,
            Self::Unexpected { .. } => ApiErrorCategory::Server,
            Self::NotJson { .. } | Self::Decode(_) => ApiErrorCategory::Decode,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::InvalidInput(_) | Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Whether a caller-driven retry could plausibly succeed.
    ///
    /// The client never retries on its own except for the single replay
    /// after a token refresh.
    pub fn is_transient(&self) -> bool {
        matches!(self.category(), ApiErrorCategory::Network | ApiErrorCategory::Server)
    }

    /// Message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            Self::Entity { message, .. } | Self::Http { message, .. } if !message.is_empty() => {
                message.clone()
            }
            Self::Http { status_text, .. } => status_text.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<BookstoreError> for ApiError {
    fn from(err: BookstoreError) -> Self {
        match err {
            BookstoreError::Network(message) => Self::Network(message),
            BookstoreError::Timeout(message) => Self::Timeout(message),
            BookstoreError::Decode(message) => Self::Decode(message),
            BookstoreError::InvalidInput(message) => Self::InvalidInput(message),
            BookstoreError::Config(message) => Self::Config(message),
            BookstoreError::Auth(message) | BookstoreError::Internal(message) => {
                Self::unexpected(message)
            }
        }
    }
}

impl From<InfraError> for ApiError {
    fn from(err: InfraError) -> Self {
        BookstoreError::from(err).into()
    }
}
