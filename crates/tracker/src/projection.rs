use hb_core::{format_duration, BatterySample, TrackerState, MILLIS_PER_HOUR};
use std::fmt;

/// Where the drain rate behind an estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBasis {
    /// Average over recent recorded cycles.
    History,
    /// Only the open cycle so far, used until history has a usable rate.
    CurrentCycle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemainingTime {
    pub millis:        i64,
    pub rate_per_hour: f64,
    pub basis:         RateBasis,
}

/// Why no estimate can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    /// No cycle has been recorded yet.
    NoData,
    /// The battery is at 100%.
    BatteryFull,
    /// No positive drain rate observed yet.
    Calculating,
    /// The sample itself is unusable (zero scale, out-of-range level).
    InvalidSample,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Remaining(RemainingTime),
    Unknown(UnknownReason),
}

impl Projection {
    pub fn remaining(&self) -> Option<&RemainingTime> {
        match self {
            Self::Remaining(r) => Some(r),
            Self::Unknown(_) => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remaining(r) => f.write_str(&format_duration(r.millis)),
            Self::Unknown(UnknownReason::NoData) => f.write_str("No data yet"),
            Self::Unknown(UnknownReason::BatteryFull) => f.write_str("Not available"),
            Self::Unknown(UnknownReason::Calculating) => f.write_str("Calculating..."),
            Self::Unknown(UnknownReason::InvalidSample) => f.write_str("Unknown"),
        }
    }
}

/// Estimate how long the charge in `sample` lasts.
///
/// Prefers `average_rate` (the history average); when that is not positive,
/// falls back to the drain observed in the open cycle since it started.
pub fn project(state: &TrackerState, average_rate: f64, sample: &BatterySample) -> Projection {
    let Ok(percent) = sample.percent() else {
        return Projection::Unknown(UnknownReason::InvalidSample);
    };
    if !state.has_open_cycle() {
        return Projection::Unknown(UnknownReason::NoData);
    }
    if percent >= 100.0 {
        return Projection::Unknown(UnknownReason::BatteryFull);
    }

    if let Some(remaining) = remaining_at(percent, average_rate, RateBasis::History) {
        return Projection::Remaining(remaining);
    }

    let elapsed = sample.timestamp.saturating_sub(state.last_full_charge);
    let used = f64::from(state.charge_start_level) - percent;
    if used > 0.0 && elapsed > 0 {
        let rate = used / (elapsed as f64 / MILLIS_PER_HOUR as f64);
        if let Some(remaining) = remaining_at(percent, rate, RateBasis::CurrentCycle) {
            return Projection::Remaining(remaining);
        }
    }

    Projection::Unknown(UnknownReason::Calculating)
}

fn remaining_at(percent: f64, rate: f64, basis: RateBasis) -> Option<RemainingTime> {
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }
    let hours = percent / rate;
    Some(RemainingTime {
        // `as` saturates, so a vanishing rate cannot overflow.
        millis: (hours * MILLIS_PER_HOUR as f64) as i64,
        rate_per_hour: rate,
        basis,
    })
}
