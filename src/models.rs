//! Data models shared by the fetch, extract, aggregate and reduce stages.
//!
//! - [`EndpointRow`]: one city and the feed it publishes, if any
//! - [`NoticeRecord`]: a single normalized notice from a city's feed
//! - [`CityNotices`]: the notices of every city that produced at least one
//! - [`CityStatistics`]: per-city summary derived from its notices
//! - [`AggregateReport`]: notices plus the reason each missing city failed

use crate::error::FailureReason;
use crate::stats::parse_posting_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Notices keyed by city name. A missing key means the city failed or had
/// no notices; it never stands for "zero notices".
pub type CityNotices = HashMap<String, Vec<NoticeRecord>>;

/// Returns `true` for endpoint values that mean "no feed known for this city".
pub fn is_missing_endpoint(endpoint: &str) -> bool {
    let endpoint = endpoint.trim();
    endpoint.is_empty() || endpoint.eq_ignore_ascii_case("null")
}

/// A row of the endpoint table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRow {
    /// City name, used as the key of every downstream mapping.
    pub city: String,
    /// Feed URL; `None` when the table only has a sentinel for this city.
    pub endpoint: Option<String>,
}

impl EndpointRow {
    pub fn new(city: impl Into<String>, endpoint: Option<&str>) -> Self {
        Self {
            city: city.into(),
            endpoint: endpoint
                .filter(|e| !is_missing_endpoint(e))
                .map(|e| e.trim().to_string()),
        }
    }
}

/// A single notice taken from a city's notice board feed.
///
/// `title` and `document_link` are always present, possibly empty.
/// `posting_date` is kept exactly as the feed published it; use
/// [`NoticeRecord::posted_on`] for the parsed calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NoticeRecord {
    pub title: String,
    pub posting_date: Option<String>,
    pub document_description: String,
    pub document_link: String,
}

impl NoticeRecord {
    /// The posting date as a calendar date, or `None` if absent or unparsable.
    pub fn posted_on(&self) -> Option<NaiveDate> {
        self.posting_date.as_deref().and_then(parse_posting_date)
    }
}

/// Summary statistics for one city.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CityStatistics {
    pub city: String,
    /// Notices per distinct calendar month that has at least one dated notice.
    pub avg_monthly_frequency: f64,
    /// Most frequent title word longer than three characters.
    pub dominant_keyword: Option<String>,
    pub total_count: usize,
    pub earliest_date: Option<NaiveDate>,
}

/// Everything one aggregation run produced.
#[derive(Debug, Default)]
pub struct AggregateReport {
    /// Cities whose feed yielded at least one notice.
    pub notices: CityNotices,
    /// Cities that were attempted but are absent from `notices`.
    pub failures: HashMap<String, FailureReason>,
}

impl AggregateReport {
    pub(crate) fn record(&mut self, city: String, outcome: Result<Vec<NoticeRecord>, FailureReason>) {
        match outcome {
            Ok(records) => {
                self.failures.remove(&city);
                self.notices.insert(city, records);
            }
            Err(reason) if !self.notices.contains_key(&city) => {
                self.failures.insert(city, reason);
            }
            Err(_) => {}
        }
    }
}
