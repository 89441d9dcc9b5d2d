//! Time formatting and parsing helpers shared by every surface.

/// Format a time value as `M:SS` for timeline labels.
///
/// Fractional seconds are truncated; negative inputs clamp to `0:00`.
pub fn format_seconds(time_seconds: f64) -> String {
    let total_seconds = time_seconds.max(0.0).floor() as u64;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Format an optional timepoint, rendering unanchored or malformed values
/// as the `--:--` placeholder.
pub fn format_timepoint(time_seconds: Option<f64>) -> String {
    match time_seconds {
        Some(t) if t.is_finite() => format_seconds(t),
        _ => "--:--".to_string(),
    }
}

/// Parse a typed time entry into seconds.
///
/// Accepts plain seconds (`"83"`, `"83.5"`) or minute-colon-second form
/// (`"1:23"`, `"1:23.5"`). Returns `None` for anything else.
pub fn parse_seconds_input(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some((minutes, seconds)) = trimmed.split_once(':') {
        let minutes = minutes.trim().parse::<u64>().ok()?;
        let seconds = seconds.trim().parse::<f64>().ok()?;
        if !seconds.is_finite() || seconds < 0.0 || seconds >= 60.0 {
            return None;
        }
        return Some(minutes as f64 * 60.0 + seconds);
    }

    let seconds = trimmed.parse::<f64>().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(seconds)
    } else {
        None
    }
}
