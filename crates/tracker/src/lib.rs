//! Charge-cycle state machine and remaining-time projection.
//!
//! Feed every battery sample to [`Tracker::on_sample`]; query
//! [`Tracker::projection`] to estimate how long the current charge lasts.

pub mod machine;
pub mod projection;

pub use machine::{transition, SampleOutcome, Tracker, Transition, DEBOUNCE_MILLIS, FULL_THRESHOLD_PCT};
pub use projection::{project, Projection, RateBasis, RemainingTime, UnknownReason};
