/*!
 * Configuration for ganeshactl
 */

use crate::bus::{BusKind, SERVICE};
use crate::error::{CtlError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings read from `config.toml`; command-line flags override them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtlConfig {
    /// Which bus the server is registered on
    #[serde(default)]
    pub bus: BusKind,

    /// Well-known name of the server
    #[serde(default = "default_service")]
    pub service: String,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Shorthand for log_level = debug
    #[serde(default)]
    pub verbose: bool,

    /// Print results as JSON lines
    #[serde(default)]
    pub json_output: bool,
}

fn default_service() -> String {
    SERVICE.to_string()
}

impl Default for CtlConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::System,
            service: default_service(),
            log_level: LogLevel::Warn,
            log_file: None,
            verbose: false,
            json_output: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    #[default]
    Warn,

    Info,

    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl CtlConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CtlError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| CtlError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// `<config dir>/ganeshactl/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ganeshactl").join("config.toml"))
    }

    /// An explicit path must exist and parse. The default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }
}
