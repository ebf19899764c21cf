#![forbid(unsafe_code)]

//! Human-readable sizes and relative timestamps for the recent-files list.

use chrono::{DateTime, Utc};

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count using 1024-based units, up to GB.
///
/// Values keep at most two decimals with trailing zeros removed:
/// `1536` -> `"1.5 KB"`, `1024` -> `"1 KB"`, `0` -> `"0 Bytes"`.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes >= scale.saturating_mul(1024) {
        scale *= 1024;
        unit += 1;
    }

    let value = format!("{:.2}", bytes as f64 / scale as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{value} {}", UNITS[unit])
}

/// Describe `then` relative to `now`.
///
/// Same day: `Just now`, `N minutes ago`, `1 hour ago`, `N hours ago`.
/// Then `Yesterday`, `N days ago` within a week, and a `M/D/YYYY` date
/// beyond that. Timestamps in the future count as `Just now`.
#[must_use]
pub fn format_last_modified(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - then).max(chrono::TimeDelta::zero());
    let days = diff.num_days();

    match days {
        0 => {
            let hours = diff.num_hours();
            if hours == 0 {
                let minutes = diff.num_minutes();
                if minutes <= 1 {
                    "Just now".to_string()
                } else {
                    format!("{minutes} minutes ago")
                }
            } else if hours == 1 {
                "1 hour ago".to_string()
            } else {
                format!("{hours} hours ago")
            }
        }
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => then.format("%-m/%-d/%Y").to_string(),
    }
}
