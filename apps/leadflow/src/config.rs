//! # Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config`)
//! 3. Environment (`LEADFLOW_RATE_LIMIT`)
//! 4. CLI flags
//!
//! Example file:
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! database = "/var/lib/leadflow/leads.redb"
//! backend = "redb"
//! rate_limit = 50
//! ```
//!
//! `LEADFLOW_API_KEY`, `LEADFLOW_CORS_ORIGINS` and `LEADFLOW_LOG_FORMAT`
//! are read directly by the API and logging setup.

use crate::api::get_rate_limit_from_env;
use clap::ValueEnum;
use leadflow_core::{LeadError, LeadService};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default requests per second for the HTTP API.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Maximum accepted config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// BACKEND
// =============================================================================

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// ACID database file (redb)
    #[default]
    Redb,
    /// Volatile, process-local storage
    Memory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redb => write!(f, "redb"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Resolved server and storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub backend: Backend,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: PathBuf::from("leadflow.redb"),
            backend: Backend::Redb,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

impl Config {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, LeadError> {
        toml::from_str(text)
            .map_err(|e| LeadError::InvalidInput(format!("Invalid config: {}", e)))
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, LeadError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            LeadError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(LeadError::InvalidInput(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            LeadError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then the optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, LeadError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env())
    }

    /// Apply environment overrides.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Some(rate_limit) = get_rate_limit_from_env() {
            self.rate_limit = rate_limit;
        }
        self
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open a lead service on the configured backend.
    pub fn open_service(&self) -> Result<LeadService, LeadError> {
        match self.backend {
            Backend::Redb => LeadService::with_redb(&self.database),
            Backend::Memory => Ok(LeadService::new()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.backend, Backend::Redb);
        assert_eq!(config.rate_limit, DEFAULT_RATE_LIMIT);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml_str("port = 9000\nbackend = \"memory\"\n").expect("parse");
        assert_eq!(config.port, 9000);
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.database, PathBuf::from("leadflow.redb"));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = Config::from_toml_str("colour = \"blue\"\n");
        assert!(matches!(err, Err(LeadError::InvalidInput(_))));
    }

    #[test]
    fn unknown_backend_rejected() {
        let err = Config::from_toml_str("backend = \"postgres\"\n");
        assert!(matches!(err, Err(LeadError::InvalidInput(_))));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("leadflow.toml");
        std::fs::write(
            &path,
            "host = \"0.0.0.0\"\nport = 3000\ndatabase = \"leads.redb\"\nrate_limit = 0\n",
        )
        .expect("write");

        let config = Config::from_file(&path).expect("load");
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.rate_limit, 0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_file(Path::new("/nonexistent/leadflow.toml"));
        assert!(matches!(err, Err(LeadError::IoError(_))));
    }

    #[test]
    fn memory_backend_opens_volatile_service() {
        let config = Config {
            backend: Backend::Memory,
            ..Config::default()
        };
        let service = config.open_service().expect("open");
        assert!(!service.is_persistent());
    }
}
