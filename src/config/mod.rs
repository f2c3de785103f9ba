//! Application configuration: named server profiles plus probe tuning.
//!
//! Passwords never live in the file; a profile names an environment
//! variable (`password_env`) that holds the secret, loaded through `.env`
//! when present.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ensure_env_loaded;

use std::path::Path;
use std::time::Duration;

pub const CONFIG_PATH: &str = "zmng.toml";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// One configured server profile: a discovery input plus optional
/// credentials.
#[derive(Debug, Clone)]
pub struct ServerProfile {
    pub name: String,
    /// Bare host, `host:port`, or full URL — fed to discovery as typed.
    pub host: String,
    pub username: Option<String>,
    pub password_env: Option<String>,
}

impl ServerProfile {
    /// Resolve the profile's password from its configured environment
    /// variable, if any.
    pub fn password(&self) -> Option<String> {
        self.password_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|value| !value.is_empty())
    }
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub probe_timeout: Duration,
    pub servers: Vec<ServerProfile>,
}

impl AppConfig {
    /// Load and validate configuration, falling back to `zmng.toml` in the
    /// working directory when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        loader::load_config(path)
    }

    pub fn server(&self, name: &str) -> Result<&ServerProfile, ConfigError> {
        self.servers
            .iter()
            .find(|server| server.name == name)
            .ok_or_else(|| ConfigError::ServerNotFound {
                name: name.to_string(),
            })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            servers: Vec::new(),
        }
    }
}
