//! One-shot commands: `status`, `history` and `feed`.

use crate::cli::FeedArgs;
use anyhow::{bail, Result};
use chrono::{DateTime, Local};
use hb_config::HeyBatteryConfig;
use hb_core::{format_duration, now_millis, BatterySample, ChargeCycle, TrackerState};
use hb_system::read_battery;
use hb_tracker::{Projection, RateBasis, Tracker, Transition};
use std::fmt::Write as _;
use std::path::Path;

pub fn status(config: &HeyBatteryConfig, data_dir: &Path) -> Result<()> {
    let monitor = &config.monitor;
    let Some(reading) = read_battery(&monitor.sysfs_root, monitor.supply.as_deref()) else {
        bail!("no battery found under '{}'", monitor.sysfs_root.display());
    };

    print!("{}", status_report(&reading.into_sample(now_millis()), data_dir));
    Ok(())
}

/// Feed `sample` to the tracker and render the status block.  An invalid
/// reading is logged and shown with an unknown estimate.
fn status_report(sample: &BatterySample, data_dir: &Path) -> String {
    let tracker = Tracker::open(data_dir);
    if let Err(err) = tracker.on_sample(sample) {
        tracing::warn!("Ignoring battery reading: {err}");
    }

    render_status(
        sample,
        &tracker.state(),
        tracker.average_drain_rate(),
        &tracker.projection(sample),
    )
}

pub fn history(data_dir: &Path, json: bool) -> Result<()> {
    let cycles = Tracker::open(data_dir).load_history();
    if json {
        println!("{}", serde_json::to_string_pretty(&cycles)?);
    } else {
        print!("{}", render_history(&cycles));
    }
    Ok(())
}

pub fn feed(data_dir: &Path, args: &FeedArgs) -> Result<()> {
    let sample = BatterySample::new(args.at.unwrap_or_else(now_millis), args.level, args.scale, args.charging);
    let tracker = Tracker::open(data_dir);
    let outcome = tracker.on_sample(&sample)?;

    let what = match outcome.transition {
        Transition::None => "no transition".to_string(),
        Transition::ReachedFull => "reached full charge".to_string(),
        Transition::CycleStarted(cycle) => format!("new cycle started at {}%", cycle.start_level),
        Transition::Debounced => "unplugged within an hour of the last cycle; no new cycle".to_string(),
    };
    println!("{what}");
    println!("Remaining: {}", tracker.projection(&sample));
    Ok(())
}

fn render_status(
    sample: &BatterySample,
    state: &TrackerState,
    average_rate: f64,
    projection: &Projection,
) -> String {
    let mut out = String::new();
    let level = sample.whole_percent().map_or_else(|_| "?".to_string(), |p| format!("{p}%"));
    let power = if sample.charging { "charging" } else { "discharging" };
    let since = state
        .millis_since_full_charge(sample.timestamp)
        .map_or_else(|| "No data yet".to_string(), format_duration);
    let average = if average_rate > 0.0 {
        format!("{average_rate:.1} %/h")
    } else {
        "n/a".to_string()
    };
    let basis = match projection.remaining().map(|r| r.basis) {
        Some(RateBasis::History) => " (cycle average)",
        Some(RateBasis::CurrentCycle) => " (current cycle)",
        None => "",
    };

    let _ = writeln!(out, "Battery:            {level} ({power})");
    let _ = writeln!(out, "Since full charge:  {since}");
    let _ = writeln!(out, "Average drain:      {average}");
    let _ = writeln!(out, "Remaining:          {projection}{basis}");
    out
}

fn render_history(cycles: &[ChargeCycle]) -> String {
    if cycles.is_empty() {
        return "No charge cycles recorded yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:>3}  {:<16}  {:>5}  {:>5}  {:<24}  {:>8}", "#", "started", "from", "to", "duration", "%/h");
    for (i, cycle) in cycles.iter().enumerate() {
        let started = DateTime::from_timestamp_millis(cycle.full_charge_timestamp)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".to_string());
        let rate = cycle
            .drain_rate_per_hour()
            .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
        let _ = writeln!(
            out,
            "{:>3}  {:<16}  {:>4}%  {:>4}%  {:<24}  {:>8}",
            i + 1,
            started,
            cycle.start_level,
            cycle.end_level,
            format_duration(cycle.duration_millis),
            rate,
        );
    }
    out
}
