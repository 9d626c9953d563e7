//! Human-readable formatting for telemetry values.

use chrono::Utc;

use crate::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

/// `abcdef...uvwxyz` for long addresses and keys; short ones are returned as-is.
pub fn shorten_address(address: &str, chars: usize) -> String {
    let len = address.chars().count();
    if len <= chars * 2 + 3 {
        return address.to_string();
    }
    let head: String = address.chars().take(chars).collect();
    let tail: String = address.chars().skip(len - chars).collect();
    format!("{head}...{tail}")
}

/// Bytes in binary units, trailing zeros trimmed: `1.5 KB`, `2 GB`.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{value:.decimals$}");
    let rendered = if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        rendered
    };
    format!("{rendered} {}", UNITS[unit])
}

/// Uptime as `5h`, `3d 4h` or `2mo 5d`.
pub fn format_uptime(seconds: u64) -> String {
    let hours = seconds as f64 / SECONDS_PER_HOUR as f64;
    if hours < 24.0 {
        return format!("{}h", hours.round() as u64);
    }

    let days = seconds / SECONDS_PER_DAY;
    if days >= 30 {
        return format!("{}mo {}d", days / 30, days % 30);
    }

    let remaining_hours = (hours % 24.0).round() as u64;
    if remaining_hours > 0 {
        format!("{days}d {remaining_hours}h")
    } else {
        format!("{days}d")
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Compact counts: `1.2K`, `3.4M`.
pub fn format_number(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{value:.0}")
    }
}

/// Relative age of a unix timestamp against `now` (unix seconds).
pub fn time_ago_at(timestamp: i64, now: i64) -> String {
    let seconds = now.saturating_sub(timestamp);
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

pub fn time_ago(timestamp: i64) -> String {
    time_ago_at(timestamp, Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_address() {
        assert_eq!(shorten_address("short", 6), "short");
        assert_eq!(
            shorten_address("8dRqT9xY2bKpL4mN7vWz3cJ5hF1gA6sE", 6),
            "8dRqT9...1gA6sE"
        );
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0, 2), "0 B");
        assert_eq!(format_bytes(512, 2), "512 B");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024, 2), "2 GB");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(5 * 3_600), "5h");
        assert_eq!(format_uptime(3 * 86_400 + 4 * 3_600), "3d 4h");
        assert_eq!(format_uptime(2 * 86_400), "2d");
        assert_eq!(format_uptime(65 * 86_400), "2mo 5d");
    }

    #[test]
    fn test_format_number_and_percent() {
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1_260.0), "1.3K");
        assert_eq!(format_number(3_400_000.0), "3.4M");
        assert_eq!(format_percent(33.333), "33.3%");
    }

    #[test]
    fn test_time_ago() {
        assert_eq!(time_ago_at(1_000, 1_030), "just now");
        assert_eq!(time_ago_at(1_000, 1_000 + 120), "2m ago");
        assert_eq!(time_ago_at(0, 7_200), "2h ago");
        assert_eq!(time_ago_at(0, 3 * 86_400), "3d ago");
    }
}
