use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("server entry '{server}' is missing required field 'host'")]
    MissingHost { server: String },

    #[error("duplicate server name '{name}' in configuration")]
    DuplicateServer { name: String },

    #[error("server '{name}' not found in configuration")]
    ServerNotFound { name: String },
}
