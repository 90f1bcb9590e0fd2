//! Human-readable formatting for byte counts, rates and uptime.

const UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count with two decimals, stepping through bytes, KB, MB, GB
/// and TB. Values past the TB range stay in TB.
pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Format bytes/sec as a human-readable rate
pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec))
}

/// Format uptime as HH:MM:SS, with a day count once it passes 24h
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if days == 1 {
        format!("1 day, {:02}:{:02}:{:02}", hours, minutes, secs)
    } else if days > 1 {
        format!("{} days, {:02}:{:02}:{:02}", days, hours, minutes, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}
