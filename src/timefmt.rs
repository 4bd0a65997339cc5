//! Clock, duration and pace arithmetic for logged runs.
//!
//! Durations are `HH:MM:SS` (seconds optional), clock times are time-of-day
//! strings, paces are `M:SS` per mile.

const SECONDS_PER_DAY: u64 = 24 * 3600;

/// Parse a `HH:MM:SS` (or `HH:MM`) duration into total seconds
pub fn parse_duration(duration: &str) -> Result<u64, String> {
    let parts: Vec<&str> = duration.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!(
            "Invalid duration '{}', expected hh:mm:ss",
            duration
        ));
    }

    let hours = parse_component(parts[0], duration, "hours")?;
    let minutes = parse_component(parts[1], duration, "minutes")?;
    let seconds = match parts.get(2) {
        Some(s) => parse_component(s, duration, "seconds")?,
        None => 0,
    };

    if minutes >= 60 || seconds >= 60 {
        return Err(format!("Duration '{}' out of range", duration));
    }

    hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .ok_or_else(|| format!("Duration '{}' is too long", duration))
}

/// Format seconds as a zero-padded `HH:MM:SS` duration.
/// Hours keep counting past 24.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Pad a `HH:MM` clock time to `HH:MM:SS` after validating it
pub fn normalize_clock(clock: &str) -> Result<String, String> {
    let seconds = clock_to_seconds(clock)?;
    Ok(format_duration(seconds))
}

/// Seconds since midnight for a `HH:MM` or `HH:MM:SS` clock time
pub fn clock_to_seconds(clock: &str) -> Result<u64, String> {
    let parts: Vec<&str> = clock.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("Invalid time '{}', expected hh:mm", clock));
    }

    let hour = parse_component(parts[0], clock, "hour")?;
    let minute = parse_component(parts[1], clock, "minute")?;
    let second = match parts.get(2) {
        Some(s) => parse_component(s, clock, "second")?,
        None => 0,
    };

    if hour >= 24 || minute >= 60 || second >= 60 {
        return Err(format!("Time '{}' out of range", clock));
    }

    Ok(hour * 3600 + minute * 60 + second)
}

/// End of a run as a clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTime {
    /// `HH:MM:SS`, wrapped to the 24h clock
    pub clock: String,
    /// Number of midnights crossed between start and end
    pub rolled_over_days: u64,
}

/// Add a duration to a start clock time
pub fn derive_end_time(time_started: &str, total_seconds: u64) -> Result<EndTime, String> {
    let start = clock_to_seconds(time_started)?;
    let end = start
        .checked_add(total_seconds)
        .ok_or_else(|| format!("Duration of {} seconds is too long", total_seconds))?;
    Ok(EndTime {
        clock: format_duration(end % SECONDS_PER_DAY),
        rolled_over_days: end / SECONDS_PER_DAY,
    })
}

/// Average pace per mile as `M:SS`
pub fn derive_pace(total_seconds: u64, distance_miles: f64) -> Result<String, String> {
    if !distance_miles.is_finite() || distance_miles <= 0.0 {
        return Err(format!(
            "Distance must be greater than zero to compute pace, got {}",
            distance_miles
        ));
    }
    Ok(format_pace(total_seconds as f64 / distance_miles))
}

/// Parse a stored `M:SS` pace back into seconds
pub fn parse_pace(pace: &str) -> Result<u64, String> {
    pace.trim().split(':').try_fold(0u64, |acc, part| {
        let value = part
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("Invalid pace '{}', expected m:ss", pace))?;
        acc.checked_mul(60)
            .and_then(|a| a.checked_add(value))
            .ok_or_else(|| format!("Pace '{}' out of range", pace))
    })
}

/// Format a pace in seconds as `M:SS`, minutes floored and seconds rounded
pub fn format_pace(pace_seconds: f64) -> String {
    if !pace_seconds.is_finite() || pace_seconds <= 0.0 {
        return "0:00".to_string();
    }
    let mut minutes = (pace_seconds / 60.0).floor() as u64;
    let mut seconds = (pace_seconds % 60.0).round() as u64;
    // 59.5s and up rounds into the next minute
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{}:{:02}", minutes, seconds)
}

fn parse_component(part: &str, whole: &str, what: &str) -> Result<u64, String> {
    let part = part.trim();
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Invalid {} in '{}'", what, whole));
    }
    part.parse()
        .map_err(|_| format!("Invalid {} in '{}'", what, whole))
}
