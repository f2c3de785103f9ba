use super::error::ConfigError;
use super::{AppConfig, CONFIG_PATH, DEFAULT_PROBE_TIMEOUT_SECS, ServerProfile};
use dotenvy::dotenv;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    probe_timeout_secs: Option<u64>,
    #[serde(default)]
    servers: Vec<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    name: String,
    host: Option<String>,
    username: Option<String>,
    password_env: Option<String>,
}

/// Ensures environment variables are loaded from .env once per process.
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = dotenv();
    });
}

pub(super) fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    let config_path = path.unwrap_or_else(|| Path::new(CONFIG_PATH));
    read_config(config_path)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let mut seen = HashSet::new();
    let mut servers = Vec::with_capacity(parsed.servers.len());
    for raw in parsed.servers {
        let Some(host) = raw.host.filter(|host| !host.trim().is_empty()) else {
            return Err(ConfigError::MissingHost { server: raw.name });
        };
        if !seen.insert(raw.name.clone()) {
            return Err(ConfigError::DuplicateServer { name: raw.name });
        }
        servers.push(ServerProfile {
            name: raw.name,
            host,
            username: raw.username,
            password_env: raw.password_env,
        });
    }

    Ok(AppConfig {
        probe_timeout: Duration::from_secs(
            parsed
                .probe_timeout_secs
                .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
        ),
        servers,
    })
}
