// src/dates.rs
//! Date helpers shared by gates and records: URL date extraction, article age,
//! and the `YYYY-MM-DD` partition key stamped on every persisted record.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Partition key format used across all persisted records.
pub fn date_partition(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

static URL_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d{4})/(\d{2})/(\d{2})/").expect("url date regex"));

/// Extract a publication date from a `/YYYY/MM/DD/slug` URL path segment.
/// Returns `None` when the pattern is absent or names an invalid calendar day.
pub fn parse_date_from_url(url: &str) -> Option<DateTime<Utc>> {
    let caps = URL_DATE_RE.captures(url)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Age of `then` relative to `now`, in fractional hours.
pub fn age_hours(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - then).num_seconds() as f64 / 3600.0
}
