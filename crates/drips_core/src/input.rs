//! Validation applied before a store operation is invoked. The store itself
//! trusts its arguments.

use crate::error::AppError;
use crate::time_util::parse_hour_minute;
use time::Time;

pub fn validate_title(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_id(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed)
}

/// Accepts `H:M` / `HH:MM` in 24-hour form and returns the zero-padded
/// `HH:MM` that gets stored.
pub fn parse_time_input(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("time is required"));
    }
    let (hour, minute) = parse_hour_minute(trimmed).ok_or_else(|| {
        AppError::invalid_input("time must be HH:MM with hours 0-23 and minutes 0-59")
    })?;
    let time = Time::from_hms(hour, minute, 0)
        .map_err(|err| AppError::invalid_input(err.to_string()))?;
    Ok(format!("{:02}:{:02}", time.hour(), time.minute()))
}

/// Negative counts select nothing, mirroring a count of zero.
pub fn clamp_daily_count(count: i64) -> usize {
    usize::try_from(count.max(0)).unwrap_or(usize::MAX)
}

pub fn parse_daily_count(raw: &str) -> Result<usize, AppError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::invalid_input("count must be a whole number"))?;
    Ok(clamp_daily_count(value))
}
