//! Configuration file loading
//!
//! The path comes from the first command-line argument, then the
//! `PLANTWATCH_CONFIG` environment variable, then `plantwatch.json` in the
//! working directory. Only the last one may be missing: without a file the
//! built-in defaults apply.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use plantwatch_core::{AgentConfig, ConfigError};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "PLANTWATCH_CONFIG";

/// Config file used when nothing else is named
pub const DEFAULT_CONFIG_PATH: &str = "plantwatch.json";

/// Failures while obtaining a usable configuration
#[derive(Debug, Error)]
pub enum LoadError {
    /// File named explicitly but unreadable
    #[error("Cannot read {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not a valid configuration document
    #[error("Cannot parse {path}: {source}")]
    Parse {
        /// File that was parsed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Parsed, but fails validation
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Where the config comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or in the environment; must exist
    Explicit(PathBuf),
    /// The default path; may be absent
    Default(PathBuf),
}

impl ConfigSource {
    /// Resolve from the first CLI argument and the environment value
    pub fn resolve(arg: Option<String>, env: Option<String>) -> Self {
        match arg.or(env).filter(|p| !p.is_empty()) {
            Some(path) => ConfigSource::Explicit(PathBuf::from(path)),
            None => ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_PATH)),
        }
    }

    /// Resolve from the real process arguments and environment
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok())
    }

    /// Path this source points at
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Default(path) => path,
        }
    }

    /// Read, parse and validate
    pub fn load(&self) -> Result<AgentConfig, LoadError> {
        let path = self.path();
        let config = match fs::read_to_string(path) {
            Ok(text) => parse(&text).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && matches!(self, ConfigSource::Default(_)) => {
                log::warn!("{} not found, using built-in defaults", path.display());
                AgentConfig::default()
            }
            Err(source) => {
                return Err(LoadError::Io { path: path.to_path_buf(), source });
            }
        };

        config.validate()?;
        Ok(config)
    }
}

/// Parse a JSON config document; absent fields take their defaults
pub fn parse(text: &str) -> Result<AgentConfig, serde_json::Error> {
    serde_json::from_str(text)
}
