pub mod error;
pub mod event;
pub mod state;
pub mod time;

pub use error::{BatteryError, Result};
pub use event::Message;
pub use state::{BatterySample, ChargeCycle, Phase, TrackerState, MILLIS_PER_HOUR};
pub use time::{format_duration, now_millis};
