pub mod battery;

pub use battery::{read_battery, BatteryReading};

use hb_core::{now_millis, BatterySample};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

/// What the sampler reads and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerSettings {
    pub interval:   Duration,
    pub sysfs_root: PathBuf,
    /// Power supply name such as `BAT0`; `None` picks the first battery.
    pub supply:     Option<String>,
}

/// Spawn a background Tokio task that reads the battery immediately and then
/// every `settings.interval`, forwarding timestamped [`BatterySample`]s
/// through the returned channel.
///
/// The task stops automatically when the receiver is dropped.
pub fn spawn_sampler(settings: SamplerSettings) -> mpsc::Receiver<BatterySample> {
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        let mut ticker = time::interval(settings.interval);
        // After a suspend, take one sample on wake instead of a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(reading) = read_battery(&settings.sysfs_root, settings.supply.as_deref()) else {
                tracing::debug!("No battery reading from '{}'", settings.sysfs_root.display());
                continue;
            };

            if tx.send(reading.into_sample(now_millis())).await.is_err() {
                break; // all receivers dropped
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::tests::fake_supply;

    #[tokio::test]
    async fn first_sample_arrives_immediately() {
        let root = tempfile::tempdir().unwrap();
        fake_supply(root.path(), "BAT0", "Battery", "64", "Discharging");

        let mut rx = spawn_sampler(SamplerSettings {
            interval:   Duration::from_secs(3600),
            sysfs_root: root.path().to_path_buf(),
            supply:     None,
        });

        let sample = time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("sampler should emit at startup")
            .unwrap();
        assert_eq!(sample.level, 64);
        assert_eq!(sample.scale, 100);
        assert!(!sample.charging);
    }

    #[tokio::test]
    async fn keeps_sampling_on_interval() {
        let root = tempfile::tempdir().unwrap();
        fake_supply(root.path(), "BAT0", "Battery", "100", "Charging");

        let mut rx = spawn_sampler(SamplerSettings {
            interval:   Duration::from_millis(10),
            sysfs_root: root.path().to_path_buf(),
            supply:     Some("BAT0".into()),
        });

        for _ in 0..3 {
            let sample = time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
            assert!(sample.charging);
        }
    }
}
