pub mod schema;
pub mod watcher;

pub use schema::{HeyBatteryConfig, MonitorConfig, StorageConfig, MIN_POLL_INTERVAL_MS};
pub use watcher::ConfigWatcher;

use hb_core::{BatteryError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `HeyBatteryConfig::default()`
/// if the file doesn't exist so the monitor always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<HeyBatteryConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(HeyBatteryConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| BatteryError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config: HeyBatteryConfig =
        toml::from_str(&raw).map_err(|e| BatteryError::Config(format!("TOML parse error: {e}")))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &HeyBatteryConfig) -> Result<()> {
    if config.monitor.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        return Err(BatteryError::Config(format!(
            "monitor.poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}, got {}",
            config.monitor.poll_interval_ms
        )));
    }
    Ok(())
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("heybattery").join("heybattery.toml")
}
