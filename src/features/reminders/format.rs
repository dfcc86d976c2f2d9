//! Display formatting and input parsing for reminder times

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime};

/// Convert a 24-hour `HH:MM` string to `h:mm AM/PM` for display.
///
/// Empty input gives an empty string; input without a numeric hour is returned as-is.
pub fn format_time(time: &str) -> String {
    if time.is_empty() {
        return String::new();
    }

    let Some((hours, rest)) = time.split_once(':') else {
        return time.to_string();
    };
    let Ok(hour) = hours.trim().parse::<u32>() else {
        return time.to_string();
    };

    // Drop a trailing `:SS` if the server sent one
    let minutes = rest.split(':').next().unwrap_or(rest).trim();
    let minutes = match minutes.parse::<u32>() {
        Ok(m) => format!("{m:02}"),
        Err(_) => minutes.to_string(),
    };

    let ampm = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };

    format!("{hour12}:{minutes} {ampm}")
}

/// Badge text for a frequency or role: first letter uppercased
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn parse_time(time: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| anyhow!("Invalid time {:?}: expected HH:MM (24-hour)", time))
}

pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date {:?}: expected YYYY-MM-DD", date))
}
