//! Per-city statistics over extracted notices.

use crate::models::{CityNotices, CityStatistics, NoticeRecord};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// Parse a posting date as published by a notice board feed.
///
/// Date-times carrying an offset are converted to UTC before the date is
/// taken. Returns `None` for anything unrecognised.
pub fn parse_posting_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

/// The most frequent title word longer than three characters.
///
/// Titles are lowercased and split on whitespace. On a tie the winner is
/// the first word, in record order then title order, whose count equals
/// the maximum.
pub fn dominant_keyword<'a, I>(titles: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let words: Vec<String> = titles
        .into_iter()
        .flat_map(|title| {
            title
                .to_lowercase()
                .split_whitespace()
                .filter(|w| w.chars().count() > 3)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();

    let counts: HashMap<&str, usize> = words.iter().map(String::as_str).counts();
    let max = counts.values().copied().max()?;
    words.iter().find(|w| counts[w.as_str()] == max).cloned()
}

/// Reduce one city's notices to its summary statistics.
pub fn reduce(city: &str, records: &[NoticeRecord]) -> CityStatistics {
    let dates: Vec<NaiveDate> = records.iter().filter_map(NoticeRecord::posted_on).collect();
    let months: BTreeSet<(i32, u32)> = dates.iter().map(|d| (d.year(), d.month())).collect();

    let total_count = records.len();
    let avg_monthly_frequency = if months.is_empty() {
        0.0
    } else {
        total_count as f64 / months.len() as f64
    };

    let undated = total_count - dates.len();
    if undated > 0 {
        debug!(%city, undated, "Notices without a parsable posting date");
    }

    CityStatistics {
        city: city.to_string(),
        avg_monthly_frequency,
        dominant_keyword: dominant_keyword(records.iter().map(|r| r.title.as_str())),
        total_count,
        earliest_date: dates.into_iter().min(),
    }
}

/// Reduce every city, sorted by city name.
#[instrument(level = "info", skip_all, fields(cities = notices.len()))]
pub fn reduce_all(notices: &CityNotices) -> Vec<CityStatistics> {
    notices
        .iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
        .map(|(city, records)| reduce(city, records))
        .collect()
}
