//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/lexfocus/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/lexfocus/` (~/.config/lexfocus/)
//! - Data: `$XDG_DATA_HOME/lexfocus/` (~/.local/share/lexfocus/)
//! - State/Logs: `$XDG_STATE_HOME/lexfocus/` (~/.local/state/lexfocus/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Nominal timer phase durations
    #[serde(default)]
    pub timer: TimerConfig,

    /// Statistics storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Nominal phase durations, in seconds.
///
/// These drive the (out-of-scope) countdown UI; the statistics engine only
/// ever credits actual elapsed time reported by lifecycle events.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TimerConfig {
    /// Work phase length (default 25 minutes)
    #[serde(default = "default_work_secs")]
    pub work_secs: u32,

    /// Short break length (default 5 minutes)
    #[serde(default = "default_short_break_secs")]
    pub short_break_secs: u32,

    /// Long break length (default 15 minutes)
    #[serde(default = "default_long_break_secs")]
    pub long_break_secs: u32,

    /// Start the next phase automatically when one ends
    #[serde(default)]
    pub auto_start: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_secs: default_work_secs(),
            short_break_secs: default_short_break_secs(),
            long_break_secs: default_long_break_secs(),
            auto_start: false,
        }
    }
}

fn default_work_secs() -> u32 {
    25 * 60
}

fn default_short_break_secs() -> u32 {
    5 * 60
}

fn default_long_break_secs() -> u32 {
    15 * 60
}

/// Statistics storage configuration
#[derive(Debug, Deserialize, Default)]
pub struct StorageConfig {
    /// Override path for the statistics database
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Effective database path: the override if set, the XDG default otherwise.
    pub fn database_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(Config::database_path)
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/lexfocus/config.toml` (~/.config/lexfocus/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("lexfocus").join("config.toml")
    }

    /// Returns the data directory path (for the statistics database)
    ///
    /// `$XDG_DATA_HOME/lexfocus/` (~/.local/share/lexfocus/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("lexfocus")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/lexfocus/` (~/.local/state/lexfocus/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("lexfocus")
    }

    /// Returns the statistics database file path
    ///
    /// `$XDG_DATA_HOME/lexfocus/data.db` (~/.local/share/lexfocus/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/lexfocus/lexfocus.log` (~/.local/state/lexfocus/lexfocus.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("lexfocus.log")
    }
}
