//! Configuration structures for the API client
//!
//! All sections default sensibly so a config file only needs to name what
//! differs from a local development setup.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOCAL_ORIGIN, DEFAULT_LOGIN_PAGE, DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH,
    DEFAULT_PUBLIC_ENDPOINT, DEFAULT_REFRESH_PATH, DEFAULT_SESSION_PATH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
use crate::impl_domain_enum_conversions;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where requests go and how long they may take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL used when a request carries no override
    pub public_endpoint: String,
    /// Base URL used when a request overrides the base with `""`
    pub local_origin: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Host environment; selects how an unrecoverable 401 is handled
    pub environment: ClientEnvironment,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            public_endpoint: DEFAULT_PUBLIC_ENDPOINT.to_string(),
            local_origin: DEFAULT_LOCAL_ORIGIN.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            environment: ClientEnvironment::default(),
        }
    }
}

/// Same-origin auth routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub refresh_path: String,
    pub session_path: String,
    pub login_path: String,
    pub logout_path: String,
    /// Page an interactive client navigates to when the session is gone
    pub login_page: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            session_path: DEFAULT_SESSION_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            login_page: DEFAULT_LOGIN_PAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `bookstore_infra=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::default() }
    }
}

/// Host environment of the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientEnvironment {
    /// A user is in front of the client; a lost session sends them to login
    #[default]
    Interactive,
    /// Server-side rendering or background work; a lost session is an error
    Headless,
}

impl_domain_enum_conversions!(ClientEnvironment {
    Interactive => "interactive",
    Headless => "headless",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl_domain_enum_conversions!(LogFormat {
    Text => "text",
    Json => "json",
});
