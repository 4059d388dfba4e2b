use crate::atomic::{quarantine, read_json, write_atomic};
use hb_core::{BatteryError, ChargeCycle, Result};
use std::path::{Path, PathBuf};

/// Number of cycles retained on disk; older ones are dropped on save.
pub const MAX_CYCLES: usize = 30;

/// How many of the newest cycles feed the average drain rate.
pub const AVERAGE_WINDOW: usize = 10;

/// Drain rates at or beyond these bounds (percent per hour) are outliers.
pub const MIN_PLAUSIBLE_RATE: f64 = 0.0;
pub const MAX_PLAUSIBLE_RATE: f64 = 50.0;

/// Cycle history split into immutable past cycles and the one open cycle
/// the tracker keeps refreshing.
///
/// On disk this is a flat array whose last element is the open cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleHistory {
    closed: Vec<ChargeCycle>,
    open:   Option<ChargeCycle>,
}

impl CycleHistory {
    /// Rebuild from the stored order; the newest entry becomes the open cycle.
    pub fn from_cycles(mut cycles: Vec<ChargeCycle>) -> Self {
        let open = cycles.pop();
        Self { closed: cycles, open }
    }

    /// Flatten back into chronological order.
    pub fn into_cycles(self) -> Vec<ChargeCycle> {
        let mut cycles = self.closed;
        cycles.extend(self.open);
        cycles
    }

    /// Chronological iterator over every cycle, open one last.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ChargeCycle> {
        self.closed.iter().chain(self.open.iter())
    }

    pub fn len(&self) -> usize {
        self.closed.len() + usize::from(self.open.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_none()
    }

    pub fn open(&self) -> Option<&ChargeCycle> {
        self.open.as_ref()
    }

    pub fn closed(&self) -> &[ChargeCycle] {
        &self.closed
    }

    /// Close the current open cycle and open `cycle` in its place.
    pub fn start_cycle(&mut self, cycle: ChargeCycle) {
        if let Some(previous) = self.open.replace(cycle) {
            self.closed.push(previous);
        }
    }

    /// Refresh the open cycle.  Returns `false` when there is none.
    pub fn update_open(&mut self, timestamp: i64, level: i32) -> bool {
        match self.open.as_mut() {
            Some(cycle) => {
                cycle.update_end(timestamp, level);
                true
            }
            None => false,
        }
    }

    /// Drop the oldest cycles until at most `max` remain.
    pub fn retain_newest(&mut self, max: usize) {
        if max == 0 {
            self.closed.clear();
            self.open = None;
            return;
        }
        let keep_closed = max - 1;
        if self.closed.len() > keep_closed {
            self.closed.drain(..self.closed.len() - keep_closed);
        }
    }

    /// Mean drain rate of the newest cycles, ignoring implausible ones.
    ///
    /// Looks at no more than [`AVERAGE_WINDOW`] cycles and keeps only rates
    /// strictly between [`MIN_PLAUSIBLE_RATE`] and [`MAX_PLAUSIBLE_RATE`].
    /// Returns `0.0` when nothing qualifies.
    #[must_use]
    pub fn average_drain_rate(&self) -> f64 {
        let rates: Vec<f64> = self
            .iter()
            .rev()
            .take(AVERAGE_WINDOW)
            .filter_map(ChargeCycle::drain_rate_per_hour)
            .filter(|rate| *rate > MIN_PLAUSIBLE_RATE && *rate < MAX_PLAUSIBLE_RATE)
            .collect();

        if rates.is_empty() {
            return 0.0;
        }
        rates.iter().sum::<f64>() / rates.len() as f64
    }
}

/// File-backed charge-cycle history (`charge_cycles.json`).
///
/// Every operation reads the file afresh, so several handles on the same
/// path observe each other's writes.  Writers must still be serialized by
/// the caller; the store only guarantees each individual save is atomic.
#[derive(Debug, Clone)]
pub struct CycleStore {
    path: PathBuf,
}

impl CycleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored history, distinguishing a corrupt or unreadable file
    /// from an absent one (which is just an empty history).
    pub fn try_load(&self) -> Result<Vec<ChargeCycle>> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// Load the stored history, falling back to an empty one on any failure.
    ///
    /// A corrupt file is moved aside so the next save starts clean without
    /// destroying the evidence.
    pub fn load(&self) -> Vec<ChargeCycle> {
        match self.try_load() {
            Ok(cycles) => cycles,
            Err(err) => {
                crate::report_failure(&err, "Loading cycle history");
                if matches!(err, BatteryError::StorageCorrupt { .. }) {
                    quarantine(&self.path);
                }
                Vec::new()
            }
        }
    }

    pub fn load_history(&self) -> CycleHistory {
        CycleHistory::from_cycles(self.load())
    }

    /// Persist `cycles`, keeping only the newest [`MAX_CYCLES`].
    pub fn save(&self, cycles: &[ChargeCycle]) -> Result<()> {
        let start = cycles.len().saturating_sub(MAX_CYCLES);
        let json = serde_json::to_vec_pretty(&cycles[start..]).map_err(|e| {
            BatteryError::StorageWrite {
                path:   self.path.clone(),
                source: e.into(),
            }
        })?;
        write_atomic(&self.path, &json)?;
        tracing::debug!("Saved {} cycle(s) to '{}'", cycles.len() - start, self.path.display());
        Ok(())
    }

    pub fn save_history(&self, history: CycleHistory) -> Result<()> {
        self.save(&history.into_cycles())
    }

    /// Open `cycle` as the newest entry, closing the previous one.
    pub fn append(&self, cycle: ChargeCycle) -> Result<()> {
        let mut history = self.load_history();
        history.start_cycle(cycle);
        history.retain_newest(MAX_CYCLES);
        self.save_history(history)
    }

    /// Refresh the open cycle's duration and end level.
    ///
    /// Returns `Ok(false)` without writing when the history is empty.
    pub fn update_last(&self, timestamp: i64, level: i32) -> Result<bool> {
        let mut history = self.load_history();
        if !history.update_open(timestamp, level) {
            return Ok(false);
        }
        self.save_history(history)?;
        Ok(true)
    }

    /// Average drain rate over the stored history; see
    /// [`CycleHistory::average_drain_rate`].
    pub fn average_drain_rate(&self) -> f64 {
        self.load_history().average_drain_rate()
    }
}
