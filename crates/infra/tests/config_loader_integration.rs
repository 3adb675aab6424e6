//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use bookstore_domain::{ClientEnvironment, LogFormat};
use bookstore_infra::config;
use tempfile::Builder;

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "api": {
            "public_endpoint": "https://books.example.com/api/v1",
            "local_origin": "https://shop.example.com",
            "timeout_secs": 10,
            "environment": "headless"
        },
        "auth": {
            "refresh_path": "/api/session/refresh"
        },
        "logging": {
            "level": "debug",
            "format": "json"
        }
    }"#;

    let mut file = Builder::new().suffix(".json").tempfile().expect("Failed to create temp file");
    file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.api.public_endpoint, "https://books.example.com/api/v1");
    assert_eq!(config.api.local_origin, "https://shop.example.com");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.api.environment, ClientEnvironment::Headless);
    assert_eq!(config.auth.refresh_path, "/api/session/refresh");
    // Untouched fields keep their defaults
    assert_eq!(config.auth.session_path, "/api/auth/token");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[api]
public_endpoint = "https://books.example.com/api/v1"

[auth]
login_page = "/signin"
"#;

    let mut file = Builder::new().suffix(".toml").tempfile().expect("Failed to create temp file");
    file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.api.public_endpoint, "https://books.example.com/api/v1");
    assert_eq!(config.api.environment, ClientEnvironment::Interactive);
    assert_eq!(config.auth.login_page, "/signin");
    assert_eq!(config.logging.format, LogFormat::Text);
}

#[test]
fn test_invalid_file_is_a_config_error() {
    let mut file = Builder::new().suffix(".toml").tempfile().expect("Failed to create temp file");
    file.write_all(b"[api\npublic_endpoint = ").expect("Failed to write to temp file");

    let err = config::load_from_file(Some(file.path().to_path_buf())).unwrap_err();
    assert!(err.to_string().contains("Invalid TOML format"));
}

#[test]
fn test_missing_file_is_a_config_error() {
    let err = config::load_from_file(Some("/nonexistent/bookstore.toml".into())).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}
