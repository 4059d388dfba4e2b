//! Durable storage for charge-cycle history and tracker flags.
//!
//! Both files are JSON, written through a temp-file + fsync + rename path so
//! an interrupted write leaves either the old or the new complete file.

mod atomic;
pub mod cycles;
pub mod flags;

pub use cycles::{CycleHistory, CycleStore, MAX_CYCLES};
pub use flags::StateStore;

use hb_core::BatteryError;
use std::path::{Path, PathBuf};

/// File name of the cycle history inside the data directory.
pub const HISTORY_FILE: &str = "charge_cycles.json";
/// File name of the tracker flags inside the data directory.
pub const STATE_FILE: &str = "tracker_state.json";

/// Log a storage failure at a level matching its severity.
///
/// Storage errors never reach the display layer; this is where they end.
pub fn report_failure(err: &BatteryError, action: &str) {
    if err.is_recoverable() {
        tracing::warn!("{action} failed: {err}");
    } else {
        tracing::error!("{action} failed (needs attention): {err}");
    }
}

/// Return the default data directory, honouring `$XDG_DATA_HOME`.
pub fn default_data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("heybattery")
}

/// Open both stores inside `dir`.
pub fn open_in(dir: impl AsRef<Path>) -> (CycleStore, StateStore) {
    let dir = dir.as_ref();
    (CycleStore::new(dir.join(HISTORY_FILE)), StateStore::new(dir.join(STATE_FILE)))
}
