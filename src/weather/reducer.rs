//! Reduction of an irregular forecast series to one entry per calendar day.
//!
//! Entries are grouped by the first ten characters of their timestamp
//! (`YYYY-MM-DD`, no timezone conversion). Within a day the entry whose UTC
//! hour is closest to [`TARGET_HOUR`] is kept; on equal distance the entry seen
//! first stays. Days are emitted in order of first appearance.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

use crate::models::{DailyForecast, ForecastEntry};
use crate::{ProxyError, Result};

/// Hour of day (UTC) the daily pick is anchored to
pub const TARGET_HOUR: u32 = 14;

const DATE_PREFIX_LEN: usize = 10;

/// ISO-8601 forms accepted besides full RFC 3339, with and without an offset
const OFFSET_FORMATS: [&str; 1] = ["%Y-%m-%dT%H:%M%#z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Keep, for every calendar date in `series`, the entry closest to 14:00 UTC.
pub fn reduce_to_daily(series: Vec<ForecastEntry>) -> Result<Vec<DailyForecast>> {
    // (best entry, its distance) per date, in first-appearance order
    let mut days: Vec<(ForecastEntry, u32)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for entry in series {
        let date = calendar_date(&entry.time)?.to_string();
        let distance = hour_distance(&entry.time)?;

        match slots.get(&date) {
            Some(&slot) => {
                if distance < days[slot].1 {
                    days[slot] = (entry, distance);
                }
            }
            None => {
                slots.insert(date, days.len());
                days.push((entry, distance));
            }
        }
    }

    Ok(days
        .into_iter()
        .map(|(entry, _)| DailyForecast::from(entry))
        .collect())
}

/// The `YYYY-MM-DD` prefix of a timestamp
fn calendar_date(time: &str) -> Result<&str> {
    time.get(..DATE_PREFIX_LEN)
        .ok_or_else(|| ProxyError::reduce(format!("timestamp too short for a date: {time:?}")))
}

/// Absolute distance between the UTC hour of `time` and [`TARGET_HOUR`]
fn hour_distance(time: &str) -> Result<u32> {
    let hour = parse_utc(time)
        .ok_or_else(|| ProxyError::reduce(format!("invalid timestamp {time:?}")))?
        .hour();
    Ok(hour.abs_diff(TARGET_HOUR))
}

/// Parse an ISO-8601 timestamp; one without an offset is read as UTC
fn parse_utc(time: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(time) {
        return Some(parsed.with_timezone(&Utc));
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(time, format).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(time, format).ok())
                .map(|naive| naive.and_utc())
        })
}
