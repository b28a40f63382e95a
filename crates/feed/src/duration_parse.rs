// ABOUTME: Duration normalization for podcast episode lengths.
// ABOUTME: Canonicalizes integer seconds, MM:SS and HH:MM:SS into zero-padded clock strings.

/// Returned for empty or unrecognized durations.
pub const UNKNOWN_DURATION: &str = "00:00";

/// Normalizes an `itunes:duration` value into a display string.
///
/// - `"125"` → `"2:05"`, `"3725"` → `"1:02:05"` (plain seconds)
/// - `"5:3"` → `"05:03"` (two segments, zero-padded)
/// - `"1:02:05"` → `"01:02:05"` (three segments, zero-padded)
/// - colon strings with non-numeric segments pass through trimmed
/// - anything else → `"00:00"`
pub fn normalize_duration(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return UNKNOWN_DURATION.to_string();
    }

    if s.contains(':') {
        return normalize_clock(s).unwrap_or_else(|| s.to_string());
    }

    match s.parse::<u64>() {
        Ok(total) => format_seconds(total),
        Err(_) => UNKNOWN_DURATION.to_string(),
    }
}

/// Formats a second count as `H:MM:SS` when it spans an hour, else `M:SS`.
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

fn normalize_clock(s: &str) -> Option<String> {
    let parts: Vec<u64> = s
        .split(':')
        .filter(|part| !part.is_empty())
        .map(|part| part.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [minutes, seconds] => Some(format!("{:02}:{:02}", minutes, seconds)),
        [hours, minutes, seconds] => Some(format!("{:02}:{:02}:{:02}", hours, minutes, seconds)),
        _ => None,
    }
}
