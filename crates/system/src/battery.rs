use hb_core::{BatteryError, BatterySample, Result};
use std::path::Path;

/// Battery state as read from one power supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReading {
    /// Charge level (0–100).
    pub percent:  u8,
    /// `true` = charging / full, `false` = discharging or not charging.
    pub charging: bool,
}

impl BatteryReading {
    pub fn into_sample(self, timestamp: i64) -> BatterySample {
        BatterySample::percent_of_100(timestamp, i32::from(self.percent), self.charging)
    }
}

/// Name of the first supply under `root` whose `type` is `Battery`
/// (AC adapters and peripherals are skipped).
pub fn find_battery(root: &Path) -> Option<String> {
    let mut names: Vec<String> = std::fs::read_dir(root)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            std::fs::read_to_string(entry.path().join("type"))
                .is_ok_and(|kind| kind.trim() == "Battery")
        })
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names.into_iter().next()
}

/// Read `capacity` and `status` of the supply `name` under `root`.
pub fn read_supply(root: &Path, name: &str) -> Result<BatteryReading> {
    let base = root.join(name);
    let read = |file: &str| {
        std::fs::read_to_string(base.join(file)).map_err(|e| {
            BatteryError::System(format!("cannot read '{}': {e}", base.join(file).display()))
        })
    };

    let capacity = read("capacity")?;
    let status   = read("status")?;

    let percent = capacity
        .trim()
        .parse::<u8>()
        .map_err(|e| BatteryError::System(format!("bad capacity '{}' for {name}: {e}", capacity.trim())))?;
    let charging = matches!(status.trim(), "Charging" | "Full");

    Ok(BatteryReading { percent, charging })
}

/// Read the configured supply, or the first battery found.
///
/// Returns `None` if the system has no battery (desktop, VM) or it cannot
/// be read right now.
pub fn read_battery(root: &Path, supply: Option<&str>) -> Option<BatteryReading> {
    let name = match supply {
        Some(name) => name.to_string(),
        None => find_battery(root)?,
    };

    match read_supply(root, &name) {
        Ok(reading) => Some(reading),
        Err(e) => {
            tracing::debug!("{e}");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    pub(crate) fn fake_supply(root: &Path, name: &str, kind: &str, capacity: &str, status: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("type"), format!("{kind}\n")).unwrap();
        fs::write(dir.join("capacity"), format!("{capacity}\n")).unwrap();
        fs::write(dir.join("status"), format!("{status}\n")).unwrap();
    }

    #[test]
    fn finds_battery_and_skips_mains() {
        let root = tempfile::tempdir().unwrap();
        fake_supply(root.path(), "AC", "Mains", "0", "Unknown");
        fake_supply(root.path(), "BAT1", "Battery", "80", "Discharging");

        assert_eq!(find_battery(root.path()).as_deref(), Some("BAT1"));
    }

    #[test]
    fn full_counts_as_charging() {
        let root = tempfile::tempdir().unwrap();
        fake_supply(root.path(), "BAT0", "Battery", "100", "Full");

        let reading = read_battery(root.path(), None).unwrap();
        assert_eq!(reading, BatteryReading { percent: 100, charging: true });
    }

    #[test]
    fn not_charging_counts_as_unplugged() {
        let root = tempfile::tempdir().unwrap();
        fake_supply(root.path(), "BAT0", "Battery", "97", "Not charging");

        let sample = read_battery(root.path(), Some("BAT0")).unwrap().into_sample(5);
        assert_eq!(sample, BatterySample::new(5, 97, 100, false));
    }

    #[test]
    fn garbage_capacity_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        fake_supply(root.path(), "BAT0", "Battery", "lots", "Charging");

        assert!(matches!(read_supply(root.path(), "BAT0"), Err(BatteryError::System(_))));
        assert!(read_battery(root.path(), None).is_none());
    }

    #[test]
    fn no_battery_is_none() {
        let root = tempfile::tempdir().unwrap();
        assert!(read_battery(root.path(), None).is_none());
        assert!(read_battery(&root.path().join("missing"), None).is_none());
    }
}
