use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Smallest accepted sampling interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 1_000;

/// Root configuration structure parsed from `heybattery.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeyBatteryConfig {
    pub monitor: MonitorConfig,
    pub storage: StorageConfig,
}

/// How the monitor samples the battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Milliseconds between battery reads.
    pub poll_interval_ms: u64,
    /// Power supply to read, e.g. `"BAT0"`.  Unset = first battery found.
    pub supply: Option<String>,
    /// Directory listing power supplies.
    pub sysfs_root: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 60_000,
            supply:           None,
            sysfs_root:       PathBuf::from("/sys/class/power_supply"),
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Where history and tracker state live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Unset = `$XDG_DATA_HOME/heybattery`.
    pub data_dir: Option<PathBuf>,
}
