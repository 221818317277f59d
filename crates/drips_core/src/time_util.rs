use crate::clock::Clock;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const DATE_KEY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const HEADING_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:long], [month repr:long] [day padding:none], [year]"
);

pub fn date_key(date: Date) -> String {
    date.format(DATE_KEY_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

pub fn today_key(clock: &dyn Clock) -> String {
    date_key(clock.today())
}

pub fn parse_date_key(key: &str) -> Option<Date> {
    Date::parse(key.trim(), DATE_KEY_FORMAT).ok()
}

/// Converts a stored `HH:MM` value to a 12-hour display string such as
/// `2:30 PM`. Absent or malformed input yields an empty string.
pub fn format_time(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match parse_hour_minute(value) {
        Some((hour, minute)) => twelve_hour(hour, minute),
        None => String::new(),
    }
}

pub fn format_clock_time(instant: OffsetDateTime) -> String {
    twelve_hour(instant.hour(), instant.minute())
}

/// Long-form logbook heading for a date key, e.g. `Sunday, October 18, 2026`.
pub fn format_date_heading(key: &str) -> String {
    parse_date_key(key)
        .and_then(|date| date.format(HEADING_FORMAT).ok())
        .unwrap_or_else(|| key.to_string())
}

pub(crate) fn parse_hour_minute(value: &str) -> Option<(u8, u8)> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours = hours.trim();
    let minutes = minutes.trim();
    if hours.is_empty()
        || minutes.is_empty()
        || !hours.chars().all(|ch| ch.is_ascii_digit())
        || !minutes.chars().all(|ch| ch.is_ascii_digit())
    {
        return None;
    }
    let hour: u8 = hours.parse().ok()?;
    let minute: u8 = minutes.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

fn twelve_hour(hour: u8, minute: u8) -> String {
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        other => other,
    };
    format!("{display_hour}:{minute:02} {period}")
}

#[cfg(test)]
mod tests {
    use super::{date_key, format_clock_time, format_date_heading, format_time, today_key};
    use crate::clock::FixedClock;
    use time::macros::{date, datetime};

    #[test]
    fn format_time_converts_to_twelve_hour() {
        assert_eq!(format_time(Some("14:30")), "2:30 PM");
        assert_eq!(format_time(Some("00:05")), "12:05 AM");
        assert_eq!(format_time(Some("12:00")), "12:00 PM");
        assert_eq!(format_time(Some("9:07")), "9:07 AM");
    }

    #[test]
    fn format_time_degrades_to_empty() {
        assert_eq!(format_time(None), "");
        assert_eq!(format_time(Some("")), "");
        assert_eq!(format_time(Some("noon")), "");
        assert_eq!(format_time(Some("14")), "");
        assert_eq!(format_time(Some("24:00")), "");
        assert_eq!(format_time(Some("10:60")), "");
        assert_eq!(format_time(Some("-1:30")), "");
    }

    #[test]
    fn date_key_is_zero_padded() {
        assert_eq!(date_key(date!(2025 - 01 - 09)), "2025-01-09");
    }

    #[test]
    fn today_key_follows_clock() {
        let clock = FixedClock::new(datetime!(2025-12-31 23:59 UTC));
        assert_eq!(today_key(&clock), "2025-12-31");

        clock.set(datetime!(2026-01-01 00:00 UTC));
        assert_eq!(today_key(&clock), "2026-01-01");
    }

    #[test]
    fn format_clock_time_uses_instant_offset() {
        assert_eq!(format_clock_time(datetime!(2025-06-01 18:04 +02:00)), "6:04 PM");
    }

    #[test]
    fn format_date_heading_spells_out_date() {
        assert_eq!(format_date_heading("2026-10-18"), "Sunday, October 18, 2026");
        assert_eq!(format_date_heading("garbage"), "garbage");
    }
}
