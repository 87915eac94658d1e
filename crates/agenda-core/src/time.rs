//! Lenient parsing of the date strings collaborators hand over.
//!
//! Values without an offset are read as UTC. Anything that does not parse
//! yields `None`; callers decide what a missing instant means for them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

const OFFSET_FORMATS: &[&str] =
  &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

const NAIVE_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Parse a timestamp or a bare date (read as midnight).
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();
  if s.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Some(dt) = OFFSET_FORMATS
    .iter()
    .find_map(|f| DateTime::parse_from_str(s, f).ok())
  {
    return Some(dt.with_timezone(&Utc));
  }

  NAIVE_FORMATS
    .iter()
    .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    .or_else(|| {
      NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
    })
    .map(|naive| naive.and_utc())
}

/// Parse a calendar date. Full timestamps are accepted and truncated.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
    .ok()
    .or_else(|| parse_instant(s).map(|dt| dt.date_naive()))
}

pub fn parse_time(s: &str) -> Option<NaiveTime> {
  let s = s.trim();
  TIME_FORMATS
    .iter()
    .find_map(|f| NaiveTime::parse_from_str(s, f).ok())
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
  date.and_time(NaiveTime::MIN).and_utc()
}

/// Combine a date with an optional time of day.
///
/// A missing (or blank) time means the last second of the day. A time that
/// is present but malformed yields `None` rather than silently falling back.
pub fn at_time_or_end_of_day(
  date: &str,
  time: Option<&str>,
) -> Option<DateTime<Utc>> {
  let date = parse_date(date)?;
  let time = match time.map(str::trim).filter(|t| !t.is_empty()) {
    Some(t) => parse_time(t)?,
    None => NaiveTime::from_hms_opt(23, 59, 59)?,
  };
  Some(date.and_time(time).and_utc())
}
