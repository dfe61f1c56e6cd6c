//! Editor configuration.
//!
//! Settings are plain serde structs so hosts can persist them next to their
//! own preferences. Every field has a default, so partial files load fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HIT_RADIUS, DEFAULT_MAX_HISTORY, DEFAULT_MAX_POINTS, DEFAULT_MIN_POINTS,
};
use crate::history::HistoryConfig;
use crate::simplify::PointBudget;
use crate::slice::SlicePolicy;

/// Log level setting for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Install an `env_logger` logger at `level`.
///
/// `RUST_LOG` still overrides per-module filters. Returns false if a logger
/// was already installed.
pub fn init_logging(level: LogLevel) -> bool {
    env_logger::Builder::from_default_env()
        .filter_level(level.to_level_filter())
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_hit_radius() -> f64 {
    DEFAULT_HIT_RADIUS
}

fn default_min_points() -> usize {
    DEFAULT_MIN_POINTS
}

fn default_max_points() -> usize {
    DEFAULT_MAX_POINTS
}

/// Settings for one editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Committed states kept for undo, base state included
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Base hit radius in screen pixels before zoom scaling
    #[serde(default = "default_hit_radius")]
    pub hit_radius: f64,

    /// Floor for zoom-adaptive simplification
    #[serde(default = "default_min_points")]
    pub min_points: usize,

    /// Ceiling for zoom-adaptive simplification
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// How sliced polygons are replaced
    #[serde(default)]
    pub slice_policy: SlicePolicy,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            max_history: default_max_history(),
            hit_radius: default_hit_radius(),
            min_points: default_min_points(),
            max_points: default_max_points(),
            slice_policy: SlicePolicy::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl EditorConfig {
    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            max_entries: self.max_history,
        }
    }

    pub fn point_budget(&self) -> PointBudget {
        PointBudget::new(self.min_points, self.max_points)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        if !config.hit_radius.is_finite() || config.hit_radius <= 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "hit_radius must be positive, got {}",
                config.hit_radius
            )));
        }

        if config.min_points < crate::constants::MIN_POLYGON_VERTICES {
            return Err(ConfigError::InvalidValue(format!(
                "min_points must be at least {}, got {}",
                crate::constants::MIN_POLYGON_VERTICES,
                config.min_points
            )));
        }

        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a JSON file, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A setting is out of its valid range
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
