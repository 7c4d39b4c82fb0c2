//! Configuration file handling
//!
//! Stored as TOML under the user config directory. Every field has a default,
//! so an empty or missing file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::battery::ProtocolTiming;
use crate::catalog;
use crate::device::DeviceModel;
use crate::protocol::timing;

/// Longest accepted poll interval (one day)
pub const MAX_POLL_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Poll interval for a user-supplied number of seconds, clamped to 1s..=1 day
pub fn poll_interval_from_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(1, MAX_POLL_INTERVAL_SECS))
}

/// Battery exchange waits in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub settle_ms: u64,
    pub prime_gap_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: timing::SETTLE_MS,
            prime_gap_ms: timing::PRIME_GAP_MS,
        }
    }
}

impl From<TimingConfig> for ProtocolTiming {
    fn from(t: TimingConfig) -> Self {
        ProtocolTiming::from_millis(t.settle_ms, t.prime_gap_ms)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between readings in watch mode
    pub poll_interval_secs: u64,
    /// Look for a better-priority device on every poll
    pub switch_check: bool,
    pub timing: TimingConfig,
    /// Include the built-in device table
    pub builtin_devices: bool,
    /// Extra devices, merged with the built-in table
    pub devices: Vec<DeviceModel>,
    /// Where to export status files; disabled when unset
    pub status_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            switch_check: true,
            timing: TimingConfig::default(),
            builtin_devices: true,
            devices: Vec::new(),
            status_dir: None,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("endgame-battery")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Device models to manage: built-ins (if enabled) followed by extras
    pub fn models(&self) -> Vec<DeviceModel> {
        let mut models = if self.builtin_devices {
            catalog::builtin_models()
        } else {
            Vec::new()
        };
        for extra in &self.devices {
            for pid in extra.supported_pids() {
                if let Some(owner) = catalog::model_for_pid(&models, pid) {
                    warn!(
                        "{}: PID 0x{:04X} is also listed by {}, the first in priority order wins",
                        extra.kind, pid, owner.kind
                    );
                }
            }
            models.push(extra.clone());
        }
        models
    }

    pub fn poll_interval(&self) -> Duration {
        poll_interval_from_secs(self.poll_interval_secs)
    }

    pub fn protocol_timing(&self) -> ProtocolTiming {
        self.timing.into()
    }
}
