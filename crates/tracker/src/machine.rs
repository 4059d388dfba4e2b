use crate::projection::{project, Projection};
use hb_core::{BatterySample, ChargeCycle, Phase, Result, TrackerState, MILLIS_PER_HOUR};
use hb_store::{report_failure, CycleStore, StateStore};
use std::path::Path;
use tracing::{debug, info};

/// Percentage at or above which a charging battery counts as full.
pub const FULL_THRESHOLD_PCT: i32 = 99;

/// Minimum gap between two cycle starts.
pub const DEBOUNCE_MILLIS: i64 = MILLIS_PER_HOUR;

/// What a single sample did to the tracker flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    None,
    /// `Idle → ReachedFull`.
    ReachedFull,
    /// Unplugged after a full charge; this cycle is now the open one.
    CycleStarted(ChargeCycle),
    /// Unplugged after a full charge too soon after the previous cycle
    /// start.  The full signal is consumed without opening a cycle.
    Debounced,
}

/// Apply one valid sample to the flags.
///
/// `level` is the sample's whole percentage.  Returns the next flags and
/// the transition taken; the caller persists both.
pub fn transition(state: &TrackerState, sample: &BatterySample, level: i32) -> (TrackerState, Transition) {
    let mut next = *state;

    if sample.charging {
        if sample.is_at_least(FULL_THRESHOLD_PCT) {
            next.was_full = true;
            if state.phase() == Phase::Idle {
                return (next, Transition::ReachedFull);
            }
        }
        return (next, Transition::None);
    }

    if state.phase() != Phase::ReachedFull {
        return (next, Transition::None);
    }

    // The full signal is consumed by the first unplugged sample either way.
    next.was_full = false;

    let elapsed = sample.timestamp.saturating_sub(state.last_full_charge);
    if state.has_open_cycle() && elapsed <= DEBOUNCE_MILLIS {
        return (next, Transition::Debounced);
    }

    next.last_full_charge = sample.timestamp;
    next.charge_start_level = level;
    (next, Transition::CycleStarted(ChargeCycle::new(sample.timestamp, level)))
}

/// Result of feeding one sample to the [`Tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOutcome {
    pub transition: Transition,
    /// The open cycle's duration and end level were rewritten.
    pub refreshed:  bool,
}

/// Drives the charge-cycle state machine over the two durable stores.
///
/// Every call reloads state from disk, so a tracker can be created per
/// sample or kept for the lifetime of a monitor.  Calls must not overlap.
#[derive(Debug, Clone)]
pub struct Tracker {
    cycles: CycleStore,
    flags:  StateStore,
}

impl Tracker {
    pub fn new(cycles: CycleStore, flags: StateStore) -> Self {
        Self { cycles, flags }
    }

    /// Tracker over the standard file names inside `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let (cycles, flags) = hb_store::open_in(dir);
        Self::new(cycles, flags)
    }

    pub fn state(&self) -> TrackerState {
        self.flags.load()
    }

    /// Process one sample.
    ///
    /// Only an invalid sample is reported as an error; storage failures are
    /// logged and leave the previous on-disk state in place.
    pub fn on_sample(&self, sample: &BatterySample) -> Result<SampleOutcome> {
        let level = sample.whole_percent()?;
        let state = self.flags.load();
        let (next, taken) = transition(&state, sample, level);

        let current = match taken {
            Transition::CycleStarted(cycle) => {
                info!("Unplugged after full charge at {level}%; starting a new cycle");
                self.start_cycle(&state, next, cycle)
            }
            Transition::ReachedFull => {
                info!("Battery reached {level}% while charging");
                self.save_flags(&state, next)
            }
            Transition::Debounced => {
                info!(
                    "Unplugged after full charge within {} min of the last cycle start; \
                     no new cycle recorded",
                    DEBOUNCE_MILLIS / 60_000
                );
                self.save_flags(&state, next)
            }
            Transition::None => self.save_flags(&state, next),
        };

        let refreshed = current.has_open_cycle()
            && match self.cycles.update_last(sample.timestamp, level) {
                Ok(updated) => updated,
                Err(err) => {
                    report_failure(&err, "Refreshing open cycle");
                    false
                }
            };

        debug!(transition = ?taken, refreshed, "Processed sample at {level}%");
        Ok(SampleOutcome { transition: taken, refreshed })
    }

    /// Persist the flags of a freshly started cycle, then record the cycle.
    ///
    /// The flags are written first: when they cannot be saved no cycle is
    /// recorded, and the next unplugged sample tries again.  Returns the
    /// flags now on disk.
    fn start_cycle(&self, state: &TrackerState, next: TrackerState, cycle: ChargeCycle) -> TrackerState {
        if let Err(err) = self.flags.save(&next) {
            report_failure(&err, "Saving tracker state");
            return *state;
        }
        if let Err(err) = self.cycles.append(cycle) {
            report_failure(&err, "Recording new charge cycle");
            // Refreshes must not land on the previous cycle.
            let reverted = TrackerState {
                last_full_charge: state.last_full_charge,
                charge_start_level: state.charge_start_level,
                ..next
            };
            return self.save_flags(&next, reverted);
        }
        next
    }

    /// Write `next` if it differs from `state`; returns the flags now on disk.
    fn save_flags(&self, state: &TrackerState, next: TrackerState) -> TrackerState {
        if next == *state {
            return next;
        }
        match self.flags.save(&next) {
            Ok(()) => next,
            Err(err) => {
                report_failure(&err, "Saving tracker state");
                *state
            }
        }
    }

    pub fn average_drain_rate(&self) -> f64 {
        self.cycles.average_drain_rate()
    }

    pub fn load_history(&self) -> Vec<ChargeCycle> {
        self.cycles.load()
    }

    /// Remaining-time estimate for the charge level in `sample`.
    pub fn projection(&self, sample: &BatterySample) -> Projection {
        project(&self.flags.load(), self.average_drain_rate(), sample)
    }
}
