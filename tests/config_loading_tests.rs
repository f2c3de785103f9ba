// Config loading tests - testing AppConfig::load error handling
//
// Tests focused on configuration file loading, validation errors, and
// server profile lookup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;
use zmng::config::{AppConfig, ConfigError};

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("zmng.toml");
    fs::write(&path, content).expect("Failed to write zmng.toml");
    path
}

fn minimal_config() -> &'static str {
    r#"
[[servers]]
name = "home"
host = "zm.example.com"
"#
}

#[test]
fn returns_error_when_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/zmng.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn parses_minimal_config_with_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), minimal_config());

    let config = AppConfig::load(Some(&path)).expect("config loads");
    assert_eq!(config.probe_timeout, Duration::from_secs(5));
    assert_eq!(config.servers.len(), 1);
    assert_eq!(config.servers[0].name, "home");
    assert_eq!(config.servers[0].host, "zm.example.com");
    assert!(config.servers[0].username.is_none());
}

#[test]
fn honors_custom_probe_timeout() {
    let dir = tempdir().expect("tempdir");
    let content = r#"
probe_timeout_secs = 12

[[servers]]
name = "home"
host = "zm.example.com"
"#;
    let path = write_config(dir.path(), content);

    let config = AppConfig::load(Some(&path)).expect("config loads");
    assert_eq!(config.probe_timeout, Duration::from_secs(12));
}

#[test]
fn returns_error_when_host_missing() {
    let dir = tempdir().expect("tempdir");
    let content = r#"
[[servers]]
name = "home"
username = "admin"
"#;
    let path = write_config(dir.path(), content);

    let result = AppConfig::load(Some(&path));
    assert!(matches!(
        result,
        Err(ConfigError::MissingHost { server }) if server == "home"
    ));
}

#[test]
fn returns_error_when_host_is_blank() {
    let dir = tempdir().expect("tempdir");
    let content = r#"
[[servers]]
name = "home"
host = "  "
"#;
    let path = write_config(dir.path(), content);

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::MissingHost { .. })));
}

#[test]
fn returns_error_on_duplicate_server_names() {
    let dir = tempdir().expect("tempdir");
    let content = r#"
[[servers]]
name = "home"
host = "zm-a.example.com"

[[servers]]
name = "home"
host = "zm-b.example.com"
"#;
    let path = write_config(dir.path(), content);

    let result = AppConfig::load(Some(&path));
    assert!(matches!(
        result,
        Err(ConfigError::DuplicateServer { name }) if name == "home"
    ));
}

#[test]
fn returns_error_on_invalid_toml() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "servers = not valid toml [");

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn looks_up_servers_by_name() {
    let dir = tempdir().expect("tempdir");
    let content = r#"
[[servers]]
name = "home"
host = "zm.example.com"
username = "admin"
password_env = "ZMNG_HOME_PASSWORD"

[[servers]]
name = "office"
host = "http://10.0.0.5:8080"
"#;
    let path = write_config(dir.path(), content);

    let config = AppConfig::load(Some(&path)).expect("config loads");
    let office = config.server("office").expect("office exists");
    assert_eq!(office.host, "http://10.0.0.5:8080");

    let result = config.server("garage");
    assert!(matches!(
        result,
        Err(ConfigError::ServerNotFound { name }) if name == "garage"
    ));
}

#[test]
fn password_is_none_when_env_var_unset() {
    let dir = tempdir().expect("tempdir");
    let content = r#"
[[servers]]
name = "home"
host = "zm.example.com"
password_env = "ZMNG_TEST_SURELY_UNSET_VAR"
"#;
    let path = write_config(dir.path(), content);

    let config = AppConfig::load(Some(&path)).expect("config loads");
    assert!(config.server("home").expect("home exists").password().is_none());
}
