//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variable is missing, falls back to loading from file
//! 3. Searches several paths for a config file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `BOOKSTORE_API_ENDPOINT`: Public API base URL (required)
//! - `BOOKSTORE_LOCAL_ORIGIN`: Base URL of the local route handlers
//! - `BOOKSTORE_TIMEOUT_SECS`: Transport timeout in seconds
//! - `BOOKSTORE_ENVIRONMENT`: `interactive` or `headless`
//! - `BOOKSTORE_REFRESH_PATH`: Same-origin refresh-token route
//! - `BOOKSTORE_SESSION_PATH`: Same-origin route that stores a token in the
//!   session
//! - `BOOKSTORE_LOGIN_PAGE`: Page to navigate to when the session is lost
//! - `BOOKSTORE_LOG_LEVEL`: `EnvFilter` directive
//! - `BOOKSTORE_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./bookstore.json` or `./bookstore.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use bookstore_domain::{BookstoreError, ClientEnvironment, Config, LogFormat, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `BookstoreError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `BOOKSTORE_API_ENDPOINT` is required; every other value falls back
/// to its default when unset.
///
/// # Errors
/// Returns `BookstoreError::Config` if the required variable is missing or
/// any value fails to parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.api.public_endpoint = env_var("BOOKSTORE_API_ENDPOINT")?;

    if let Some(origin) = env_opt("BOOKSTORE_LOCAL_ORIGIN") {
        config.api.local_origin = origin;
    }
    if let Some(timeout) = env_opt("BOOKSTORE_TIMEOUT_SECS") {
        config.api.timeout_secs = timeout
            .parse::<u64>()
            .map_err(|e| BookstoreError::Config(format!("Invalid timeout: {}", e)))?;
    }
    if let Some(environment) = env_opt("BOOKSTORE_ENVIRONMENT") {
        config.api.environment =
            environment.parse::<ClientEnvironment>().map_err(BookstoreError::Config)?;
    }

    if let Some(path) = env_opt("BOOKSTORE_REFRESH_PATH") {
        config.auth.refresh_path = path;
    }
    if let Some(path) = env_opt("BOOKSTORE_SESSION_PATH") {
        config.auth.session_path = path;
    }
    if let Some(page) = env_opt("BOOKSTORE_LOGIN_PAGE") {
        config.auth.login_page = page;
    }

    if let Some(level) = env_opt("BOOKSTORE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if env_bool("BOOKSTORE_LOG_JSON", false) {
        config.logging.format = LogFormat::Json;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches several locations for a config file.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `BookstoreError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BookstoreError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            BookstoreError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BookstoreError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BookstoreError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BookstoreError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(BookstoreError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Search several paths for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_path() -> Option<PathBuf> {
    const NAMES: [&str; 6] = [
        "config.json",
        "config.toml",
        "bookstore.json",
        "bookstore.toml",
        "../config.json",
        "../config.toml",
    ];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `BookstoreError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        BookstoreError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use bookstore_domain::constants::DEFAULT_REFRESH_PATH;
    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 9] = [
        "BOOKSTORE_API_ENDPOINT",
        "BOOKSTORE_LOCAL_ORIGIN",
        "BOOKSTORE_TIMEOUT_SECS",
        "BOOKSTORE_ENVIRONMENT",
        "BOOKSTORE_REFRESH_PATH",
        "BOOKSTORE_SESSION_PATH",
        "BOOKSTORE_LOGIN_PAGE",
        "BOOKSTORE_LOG_LEVEL",
        "BOOKSTORE_LOG_JSON",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("BOOKSTORE_TEST_BOOL_ON", "ON");
        std::env::set_var("BOOKSTORE_TEST_BOOL_OFF", "off");
        std::env::remove_var("BOOKSTORE_TEST_BOOL_MISSING");

        assert!(env_bool("BOOKSTORE_TEST_BOOL_ON", false));
        assert!(!env_bool("BOOKSTORE_TEST_BOOL_OFF", true));
        assert!(env_bool("BOOKSTORE_TEST_BOOL_MISSING", true));

        std::env::remove_var("BOOKSTORE_TEST_BOOL_ON");
        std::env::remove_var("BOOKSTORE_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKSTORE_API_ENDPOINT", "https://api.books.test/v1");
        std::env::set_var("BOOKSTORE_LOCAL_ORIGIN", "https://books.test");
        std::env::set_var("BOOKSTORE_TIMEOUT_SECS", "12");
        std::env::set_var("BOOKSTORE_ENVIRONMENT", "Headless");
        std::env::set_var("BOOKSTORE_LOGIN_PAGE", "/sign-in");
        std::env::set_var("BOOKSTORE_LOG_LEVEL", "debug");
        std::env::set_var("BOOKSTORE_LOG_JSON", "true");

        let result = load_from_env();
        assert!(result.is_ok(), "Should load config from env vars, error: {:?}", result.err());

        let config = result.unwrap();
        assert_eq!(config.api.public_endpoint, "https://api.books.test/v1");
        assert_eq!(config.api.local_origin, "https://books.test");
        assert_eq!(config.api.timeout_secs, 12);
        assert_eq!(config.api.environment, ClientEnvironment::Headless);
        assert_eq!(config.auth.login_page, "/sign-in");
        assert_eq!(config.auth.refresh_path, DEFAULT_REFRESH_PATH);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_endpoint() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let result = load_from_env();
        assert!(matches!(result, Err(BookstoreError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKSTORE_API_ENDPOINT", "https://api.books.test/v1");
        std::env::set_var("BOOKSTORE_TIMEOUT_SECS", "soon");
        assert!(matches!(load_from_env(), Err(BookstoreError::Config(_))));

        std::env::remove_var("BOOKSTORE_TIMEOUT_SECS");
        std::env::set_var("BOOKSTORE_ENVIRONMENT", "browser");
        let err = load_from_env().unwrap_err();
        assert!(err.to_string().contains("ClientEnvironment"));

        clear_env();
    }

    #[test]
    fn test_load_from_file_json() {
        let json_content = r#"{
            "api": {
                "public_endpoint": "https://api.books.test/v1",
                "timeout_secs": 5
            },
            "auth": {
                "refresh_path": "/api/session/refresh"
            }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("Should load config from JSON file");
        assert_eq!(config.api.public_endpoint, "https://api.books.test/v1");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.auth.refresh_path, "/api/session/refresh");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(BookstoreError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
[api]
public_endpoint = "https://api.books.test/v1"
environment = "headless"

[logging]
format = "json"
"#;

        let config = parse_config(toml_content, &PathBuf::from("test.toml"))
            .expect("Should parse valid TOML");
        assert_eq!(config.api.environment, ClientEnvironment::Headless);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let result = parse_config(r#"{ "api": "#, &PathBuf::from("test.json"));
        assert!(result.is_err(), "Should fail with invalid JSON");
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
