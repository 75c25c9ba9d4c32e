//! Countdown and clock helpers for the "last update / next in" header.

use chrono::{DateTime, Local, Utc};

/// Milliseconds until `next`, floored at zero. `0` when nothing is scheduled.
pub fn remaining_ms(next: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u64 {
    next.map_or(0, |next| {
        u64::try_from((next - now).num_milliseconds()).unwrap_or(0)
    })
}

/// `MM:SS` rendering of a countdown.
pub fn format_countdown(ms: u64) -> String {
    let s = ms / 1000;
    format!("{:02}:{:02}", s / 60, s % 60)
}

/// Local `HH:MM:SS` of a fetch timestamp, `--:--:--` when there is none.
pub fn format_clock(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "--:--:--".to_string(),
        |t| t.with_timezone(&Local).format("%H:%M:%S").to_string(),
    )
}
