//! Unit tests for configuration loading and graceful degradation
//!
//! Tests cover:
//! - Missing config file at the default location falls back to defaults
//! - Explicit config path must exist
//! - Priority order for the API base URL (CLI > env > TOML > default)
//! - Partial TOML files keep defaults for absent fields
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that touch HAPPYWORLD_API_BASE_URL are marked with #[serial].

use hw_common::config::{
    resolve_api_base_url, ConfigOverrides, DashboardConfig, API_BASE_URL_ENV,
    DEFAULT_API_BASE_URL, DEFAULT_PORT,
};
use hw_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let file = write_config(
        r#"
[api]
base_url = "http://kpi.internal:9000/api"
"#,
    );

    let config = DashboardConfig::from_file(file.path()).unwrap();

    assert_eq!(config.api.base_url, "http://kpi.internal:9000/api");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.server.port, DEFAULT_PORT);
    assert_eq!(config.server.bind_addr, "127.0.0.1");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_full_toml() {
    let file = write_config(
        r#"
[api]
base_url = "https://happiness.example.org/api"
timeout_secs = 4

[server]
bind_addr = "0.0.0.0"
port = 6000

[logging]
level = "debug"
"#,
    );

    let config = DashboardConfig::from_file(file.path()).unwrap();

    assert_eq!(config.api.timeout_secs, 4);
    assert_eq!(config.server.bind_addr, "0.0.0.0");
    assert_eq!(config.server.port, 6000);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_toml_is_an_error() {
    let file = write_config("[api\nbase_url = ");
    let result = DashboardConfig::from_file(file.path());
    assert!(matches!(result, Err(Error::TomlParse(_))));
}

#[test]
#[serial]
fn test_explicit_missing_config_is_an_error() {
    env::remove_var(API_BASE_URL_ENV);
    let overrides = ConfigOverrides {
        config_path: Some("/nonexistent/happyworld/config.toml".into()),
        ..Default::default()
    };

    let result = DashboardConfig::load(&overrides);

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_overrides_apply_on_top_of_file() {
    env::remove_var(API_BASE_URL_ENV);
    let file = write_config(
        r#"
[api]
base_url = "http://from-file/api"
timeout_secs = 3
"#,
    );
    let overrides = ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        api_base_url: Some("http://from-cli/api".to_string()),
        timeout_secs: Some(7),
        port: Some(6100),
    };

    let config = DashboardConfig::load(&overrides).unwrap();

    assert_eq!(config.api.base_url, "http://from-cli/api");
    assert_eq!(config.api.timeout_secs, 7);
    assert_eq!(config.server.port, 6100);
}

#[test]
#[serial]
fn test_invalid_override_is_rejected() {
    env::remove_var(API_BASE_URL_ENV);
    let file = write_config("");
    let overrides = ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        api_base_url: Some("ftp://nope".to_string()),
        ..Default::default()
    };

    assert!(matches!(DashboardConfig::load(&overrides), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_resolve_base_url_priority() {
    env::remove_var(API_BASE_URL_ENV);

    // Priority 4 (the file value already defaults to the compiled default)
    assert_eq!(resolve_api_base_url(None, DEFAULT_API_BASE_URL), DEFAULT_API_BASE_URL);

    // Priority 3: TOML
    assert_eq!(resolve_api_base_url(None, "http://toml/api"), "http://toml/api");

    // Priority 2: environment beats TOML
    env::set_var(API_BASE_URL_ENV, "http://env/api");
    assert_eq!(resolve_api_base_url(None, "http://toml/api"), "http://env/api");

    // Priority 1: CLI beats environment
    assert_eq!(
        resolve_api_base_url(Some("http://cli/api"), "http://toml/api"),
        "http://cli/api"
    );

    env::remove_var(API_BASE_URL_ENV);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(API_BASE_URL_ENV, "   ");
    assert_eq!(resolve_api_base_url(None, "http://toml/api"), "http://toml/api");
    env::remove_var(API_BASE_URL_ENV);
}
