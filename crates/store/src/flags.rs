use crate::atomic::{quarantine, read_json, write_atomic};
use hb_core::{BatteryError, Result, TrackerState};
use std::path::{Path, PathBuf};

/// File-backed tracker flags (`tracker_state.json`).
///
/// The three flags are always written together as one [`TrackerState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absent file → default flags.
    pub fn try_load(&self) -> Result<TrackerState> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// Load the flags, falling back to defaults on any failure.
    pub fn load(&self) -> TrackerState {
        match self.try_load() {
            Ok(state) => state,
            Err(err) => {
                crate::report_failure(&err, "Loading tracker state");
                if matches!(err, BatteryError::StorageCorrupt { .. }) {
                    quarantine(&self.path);
                }
                TrackerState::default()
            }
        }
    }

    pub fn save(&self, state: &TrackerState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state).map_err(|e| BatteryError::StorageWrite {
            path:   self.path.clone(),
            source: e.into(),
        })?;
        write_atomic(&self.path, &json)
    }
}
