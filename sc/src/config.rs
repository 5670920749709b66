//! StepCalc configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pacing::{DEFAULT_TICK_MS, Pacing};

/// Main StepCalc configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Progress channel configuration
    pub channel: ChannelConfig,

    /// Artificial work delays
    pub pacing: PacingConfig,

    /// Monitor process configuration
    pub monitor: MonitorConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .stepcalc.yml
        let local_config = PathBuf::from(".stepcalc.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/stepcalc/stepcalc.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("stepcalc").join("stepcalc.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are ignored here; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::new(Duration::from_millis(self.pacing.work_unit_ms))
    }
}

/// Progress channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Slot file shared with the monitor
    pub path: PathBuf,

    /// Monitor poll interval in milliseconds
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            path: progchan::default_channel_path(),
            poll_interval_ms: progchan::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Artificial work delay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Length of one work tick in milliseconds (0 disables delays)
    #[serde(rename = "work-unit-ms")]
    pub work_unit_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            work_unit_ms: DEFAULT_TICK_MS,
        }
    }
}

/// Monitor process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Launch a monitor when the REPL starts
    pub autostart: bool,

    /// Command prefix that opens a new terminal, e.g. ["xterm", "-e"]
    pub terminal: Vec<String>,

    /// How long to wait for the monitor to exit after the sentinel
    #[serde(rename = "stop-timeout-ms")]
    pub stop_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            autostart: false,
            terminal: Vec::new(),
            stop_timeout_ms: 5000,
        }
    }
}
