//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::index::CollectionPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub collections: CollectionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Time-bucket model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_n_bins")]
    pub n_bins: usize,

    #[serde(default = "default_zoom_ratio")]
    pub zoom_ratio: f64,

    #[serde(default = "default_shift_bins")]
    pub shift_bins: usize,
}

fn default_n_bins() -> usize {
    1000
}

fn default_zoom_ratio() -> f64 {
    0.5
}

fn default_shift_bins() -> usize {
    10
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_bins: default_n_bins(),
            zoom_ratio: default_zoom_ratio(),
            shift_bins: default_shift_bins(),
        }
    }
}

/// Interval collection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    #[serde(default = "default_margin")]
    pub margin: usize,

    #[serde(default = "default_min_rows")]
    pub min_rows: usize,

    #[serde(default = "default_min_density")]
    pub min_density: usize,
}

fn default_margin() -> usize {
    25
}

fn default_min_rows() -> usize {
    1_000_000
}

fn default_min_density() -> usize {
    100
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            min_rows: default_min_rows(),
            min_density: default_min_density(),
        }
    }
}

impl CollectionConfig {
    /// Keep-or-reset policy for registered collections
    pub fn policy(&self) -> CollectionPolicy {
        CollectionPolicy {
            margin: self.margin,
            min_rows: self.min_rows,
            min_density: self.min_density,
        }
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

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("tracescope").join("config.toml")),
            Some(PathBuf::from("/etc/tracescope/config.toml")),
            Some(PathBuf::from("./tracescope.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Unparsable numbers are ignored
        if let Ok(n_bins) = std::env::var("TRACESCOPE_N_BINS") {
            if let Ok(n) = n_bins.parse() {
                self.model.n_bins = n;
            }
        }
        if let Ok(margin) = std::env::var("TRACESCOPE_MARGIN") {
            if let Ok(m) = margin.parse() {
                self.collections.margin = m;
            }
        }

        if let Ok(level) = std::env::var("TRACESCOPE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TRACESCOPE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
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
    r#"# Tracescope Configuration
#
# Environment variables override these settings:
# - TRACESCOPE_N_BINS
# - TRACESCOPE_MARGIN
# - TRACESCOPE_LOG_LEVEL
# - TRACESCOPE_LOG_FORMAT

[model]
# Number of regular bins in the graph
n_bins = 1000

# Fraction of the window added or removed by one zoom step
zoom_ratio = 0.5

# Bins moved by one shift step
shift_bins = 10

[collections]
# Context entries kept around every match
margin = 25

# Traces at least this long always keep their collections
min_rows = 1000000

# Smaller traces reset collections with fewer entries per interval
min_density = 100

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
