use crate::error::{CheckError, Result};

const UNITS: [(&str, u64); 3] = [("days", 24 * 60 * 60), ("hours", 60 * 60), ("minutes", 60)];

/// Render a time span as e.g. `2 days 3 hours 5 minutes 12 seconds`.
///
/// The span is rounded to whole seconds, then split by floor division from
/// days down. Leading zero units are left out, but once a unit is shown all
/// smaller ones follow. Seconds are always shown.
pub fn format_duration(seconds: f64) -> Result<String> {
    if !seconds.is_finite() {
        return Err(CheckError::InvalidDuration(seconds));
    }
    if seconds < 0.0 {
        return Err(CheckError::NegativeDuration(seconds));
    }

    let mut remaining = seconds.round() as u64;
    let mut parts = Vec::with_capacity(UNITS.len() + 1);

    for (name, size) in UNITS {
        let count = remaining / size;
        remaining %= size;
        if count > 0 || !parts.is_empty() {
            parts.push(format!("{} {}", count, name));
        }
    }
    parts.push(format!("{} seconds", remaining));

    Ok(parts.join(" "))
}
