//! Wall-clock access and human-readable durations.

/// Format a millisecond span as e.g. `"2 hours and 5 minutes"`, `"1 hour"`
/// or `"45 minutes"`.  Seconds are truncated; negative spans read as zero.
pub fn format_duration(millis: i64) -> String {
    let total_minutes = millis.max(0) / 60_000;
    let hours   = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours == 0 {
        return plural(minutes, "minute");
    }
    if minutes == 0 {
        return plural(hours, "hour");
    }
    format!("{} and {}", plural(hours, "hour"), plural(minutes, "minute"))
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
