use crate::error::{BatteryError, Result};
use serde::{Deserialize, Serialize};

/// Milliseconds in one hour; drain rates are expressed per hour.
pub const MILLIS_PER_HOUR: i64 = 3_600_000;

/// One battery-status observation delivered by the host.
///
/// The charge percentage is `level / scale * 100`.  Samples with a
/// non-positive scale, a negative level or a level above the scale are
/// invalid and must not drive any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatterySample {
    /// Observation time in epoch milliseconds.
    pub timestamp: i64,
    pub level:     i32,
    pub scale:     i32,
    /// `true` while charging or reported full on external power.
    pub charging:  bool,
}

impl BatterySample {
    pub fn new(timestamp: i64, level: i32, scale: i32, charging: bool) -> Self {
        Self { timestamp, level, scale, charging }
    }

    /// Sample expressed directly as a percentage (`scale = 100`).
    pub fn percent_of_100(timestamp: i64, percent: i32, charging: bool) -> Self {
        Self::new(timestamp, percent, 100, charging)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scale <= 0 {
            return Err(BatteryError::InvalidSample(format!("scale {} is not positive", self.scale)));
        }
        if self.level < 0 || self.level > self.scale {
            return Err(BatteryError::InvalidSample(format!(
                "level {} outside 0..={}",
                self.level, self.scale
            )));
        }
        Ok(())
    }

    /// Charge percentage; fails for an invalid sample.
    pub fn percent(&self) -> Result<f64> {
        self.validate()?;
        Ok(f64::from(self.level) * 100.0 / f64::from(self.scale))
    }

    /// Whole charge percentage, truncated towards zero.
    ///
    /// Computed in integer arithmetic so e.g. `95/100` is exactly `95`.
    pub fn whole_percent(&self) -> Result<i32> {
        self.validate()?;
        // level <= scale, so the quotient is at most 100.
        Ok((i64::from(self.level) * 100 / i64::from(self.scale)) as i32)
    }

    /// `true` when the exact percentage is at least `threshold`.
    #[must_use]
    pub fn is_at_least(&self, threshold: i32) -> bool {
        self.validate().is_ok()
            && i64::from(self.level) * 100 >= i64::from(threshold) * i64::from(self.scale)
    }
}

/// One charge-to-charge interval.
///
/// Serialized with the camelCase field names of the history file; fields
/// missing from a stored object default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChargeCycle {
    /// When the cycle started (unplug after a full charge), epoch millis.
    pub full_charge_timestamp: i64,
    /// Percentage at the moment the cycle started.
    pub start_level: i32,
    /// Elapsed time since `full_charge_timestamp`, refreshed while open.
    pub duration_millis: i64,
    /// Most recently observed percentage.
    pub end_level: i32,
}

impl ChargeCycle {
    /// A freshly opened cycle: zero duration, end level equal to start level.
    pub fn new(full_charge_timestamp: i64, start_level: i32) -> Self {
        Self {
            full_charge_timestamp,
            start_level,
            duration_millis: 0,
            end_level: start_level,
        }
    }

    /// Refresh the running duration and end level from a new observation.
    /// A timestamp earlier than the cycle start clamps the duration to zero.
    pub fn update_end(&mut self, timestamp: i64, level: i32) {
        self.duration_millis = timestamp.saturating_sub(self.full_charge_timestamp).max(0);
        self.end_level = level;
    }

    /// Percent consumed per hour, `None` while the duration is zero.
    ///
    /// Negative when the level rose during the cycle (charging resumed).
    #[must_use]
    pub fn drain_rate_per_hour(&self) -> Option<f64> {
        if self.duration_millis <= 0 {
            return None;
        }
        let hours = self.duration_millis as f64 / MILLIS_PER_HOUR as f64;
        Some(f64::from(self.start_level - self.end_level) / hours)
    }
}

/// Durable tracker flags, persisted as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerState {
    /// The battery reached the full threshold while charging since the
    /// last cycle start.
    pub was_full: bool,
    /// Start of the open cycle in epoch millis; `0` = no cycle yet.
    pub last_full_charge: i64,
    /// Percentage recorded when the open cycle started.
    pub charge_start_level: i32,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            was_full:           false,
            last_full_charge:   0,
            charge_start_level: 100,
        }
    }
}

impl TrackerState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.was_full {
            Phase::ReachedFull
        } else {
            Phase::Idle
        }
    }

    /// A cycle has been started at least once and is being refreshed.
    #[must_use]
    pub fn has_open_cycle(&self) -> bool {
        self.last_full_charge > 0
    }

    /// Time since the open cycle started, `None` when there is no cycle.
    #[must_use]
    pub fn millis_since_full_charge(&self, now: i64) -> Option<i64> {
        self.has_open_cycle()
            .then(|| now.saturating_sub(self.last_full_charge).max(0))
    }
}

/// Tracker phase derived from the persisted flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the battery to reach the full threshold while charging.
    Idle,
    /// Full threshold seen; the next unplugged sample may start a cycle.
    ReachedFull,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cycle_has_zero_duration() {
        let cycle = ChargeCycle::new(1_000, 95);
        assert_eq!(cycle.end_level, 95);
        assert_eq!(cycle.duration_millis, 0);
        assert_eq!(cycle.drain_rate_per_hour(), None);
    }

    #[test]
    fn drain_rate_after_one_hour() {
        let mut cycle = ChargeCycle::new(0, 95);
        cycle.update_end(MILLIS_PER_HOUR, 85);
        assert_eq!(cycle.duration_millis, MILLIS_PER_HOUR);
        assert_eq!(cycle.drain_rate_per_hour(), Some(10.0));
    }

    #[test]
    fn drain_rate_negative_when_level_rose() {
        let mut cycle = ChargeCycle::new(0, 50);
        cycle.update_end(MILLIS_PER_HOUR, 60);
        assert_eq!(cycle.drain_rate_per_hour(), Some(-10.0));
    }

    #[test]
    fn update_before_start_clamps_to_zero() {
        let mut cycle = ChargeCycle::new(10_000, 90);
        cycle.update_end(5_000, 89);
        assert_eq!(cycle.duration_millis, 0);
        assert_eq!(cycle.end_level, 89);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let cycle: ChargeCycle = serde_json::from_str(r#"{"startLevel": 80}"#).unwrap();
        assert_eq!(cycle, ChargeCycle { start_level: 80, ..ChargeCycle::default() });
    }

    #[test]
    fn cycle_uses_camel_case_keys() {
        let json = serde_json::to_value(ChargeCycle::new(7, 95)).unwrap();
        assert_eq!(json["fullChargeTimestamp"], 7);
        assert_eq!(json["startLevel"], 95);
        assert_eq!(json["durationMillis"], 0);
        assert_eq!(json["endLevel"], 95);
    }

    #[test]
    fn sample_percent_and_threshold() {
        let sample = BatterySample::new(0, 198, 200, true);
        assert!((sample.percent().unwrap() - 99.0).abs() < 1e-9);
        assert_eq!(sample.whole_percent().ok(), Some(99));
        assert!(sample.is_at_least(99));
        assert!(!sample.is_at_least(100));
    }

    #[test]
    fn invalid_samples_have_no_percent() {
        for sample in [
            BatterySample::new(0, 50, 0, false),
            BatterySample::new(0, -1, 100, false),
            BatterySample::new(0, 101, 100, true),
        ] {
            assert!(sample.validate().is_err());
            assert!(sample.percent().is_err());
            assert!(sample.whole_percent().is_err());
            assert!(!sample.is_at_least(0));
        }
    }

    #[test]
    fn phase_follows_was_full() {
        let mut state = TrackerState::default();
        assert_eq!(state.phase(), Phase::Idle);
        state.was_full = true;
        assert_eq!(state.phase(), Phase::ReachedFull);
        assert!(!state.has_open_cycle());
        assert_eq!(state.millis_since_full_charge(100), None);
    }
}
