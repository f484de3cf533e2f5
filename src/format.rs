//! Value formatting shared by the report tables.

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Converts tracker seconds to hours; absent values count as zero.
pub fn to_hours(seconds: Option<i64>) -> f64 {
    match seconds {
        Some(value) if value != 0 => value as f64 / SECONDS_PER_HOUR,
        _ => 0.0,
    }
}

/// `dd/mm/YYYY` in the timestamp's own offset, or empty.
pub fn format_day(value: Option<&DateTime<FixedOffset>>) -> String {
    value
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// `YYYY/mm` in the timestamp's own offset, or empty.
pub fn format_month(value: Option<&DateTime<FixedOffset>>) -> String {
    value
        .map(|dt| dt.format("%Y/%m").to_string())
        .unwrap_or_default()
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Parses Jira timestamps such as `2019-04-01T19:59:00.000+0200`.
pub fn parse_jira_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok())
}

/// Text recorded in the index sheet after a run, e.g. `17/Oct/2026 (jdoe)`.
pub fn run_stamp(day: NaiveDate, user_name: &str) -> String {
    format!("{} ({})", day.format("%d/%b/%Y"), user_name)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
