//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::api::ApiConfig;
use crate::fetcher::FetcherConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reindex scheduling
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexConfig {
    /// Seconds between periodic reindexes; 0 disables them
    #[serde(default)]
    pub reindex_interval_secs: u64,
}

impl IndexConfig {
    pub fn reindex_interval(&self) -> Duration {
        Duration::from_secs(self.reindex_interval_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Whether structured JSON output was requested
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Default filter directive when RUST_LOG is unset
    pub fn filter_directive(&self) -> String {
        format!("aurora={},tower_http=info", self.level)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Candidate config files, in priority order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("aurora").join("config.toml")),
            Some(PathBuf::from("/etc/aurora/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// First default location that exists
    pub fn default_path() -> Option<PathBuf> {
        first_existing(&Self::default_paths())
    }

    /// Load from the first existing default location, else defaults plus
    /// environment.
    ///
    /// A file that exists but cannot be read or parsed is an error, not a
    /// silent fallback to defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_first(&Self::default_paths())
    }

    fn load_first(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        match first_existing(paths) {
            Some(path) => Self::load_with_env(&path),
            None => Ok(Self::from_env()),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Fetcher overrides
        if let Some(url) = lookup("AURORA_UPSTREAM_URL") {
            self.fetcher.base_url = url;
        }

        // API overrides
        if let Some(host) = lookup("AURORA_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("AURORA_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Index overrides
        if let Some(secs) = lookup("AURORA_REINDEX_INTERVAL_SECS").and_then(|s| s.parse().ok()) {
            self.index.reindex_interval_secs = secs;
        }

        // Logging overrides
        if let Some(level) = lookup("AURORA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("AURORA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn first_existing(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|path| path.exists()).cloned()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Aurora Configuration
#
# Environment variables override these settings:
# - AURORA_UPSTREAM_URL
# - AURORA_API_HOST
# - AURORA_API_PORT
# - AURORA_REINDEX_INTERVAL_SECS
# - AURORA_LOG_LEVEL
# - AURORA_LOG_FORMAT

[fetcher]
# Upstream origin serving the message listing
base_url = "https://november7-730026606190.europe-west1.run.app"

# Listing path (trailing slash avoids an upstream redirect)
messages_path = "/messages/"

# Overall timeout per upstream request (seconds)
timeout_secs = 30

# Attempts per fetch; attempt k waits k * retry_delay_ms before the next
max_retries = 3
retry_delay_ms = 1000

# Redirect hops followed per fetch (not counted against retries)
max_redirects = 3

# Page size of the first bulk request, and the upstream's implicit page size
bulk_limit = 1000
default_limit = 100

# Fetch further pages when the upstream's total exceeds the first page
follow_pages = true

[api]
host = "0.0.0.0"
port = 8000

# Page size bounds for /search and /messages
default_search_size = 10
max_search_size = 100
default_list_size = 100
max_list_size = 1000

[index]
# Periodic reindex interval in seconds (0 = only at startup and on POST /reindex)
reindex_interval_secs = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
