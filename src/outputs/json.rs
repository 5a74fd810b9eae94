//! JSON output for the presentation layer.
//!
//! # Output Structure
//!
//! Files are grouped by the date of the run:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── notices.json    # city -> notices
//!     ├── stats.json      # per-city statistics, sorted by city
//!     └── failures.json   # city -> reason it is missing from notices.json
//! ```
//!
//! Maps are written with sorted keys so reruns over the same data produce
//! identical files.

use crate::models::{AggregateReport, CityStatistics};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write notices, statistics and failures for one run.
///
/// Returns the directory the files were written to:
/// `{json_output_dir}/{date}/`.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display(), %date))]
pub async fn write_report(
    report: &AggregateReport,
    stats: &[CityStatistics],
    json_output_dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, Box<dyn Error>> {
    let full_json_dir = json_output_dir.join(date.to_string());

    info!(dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let notices: BTreeMap<_, _> = report.notices.iter().collect();
    let failures: BTreeMap<_, _> = report
        .failures
        .iter()
        .map(|(city, reason)| (city, reason.to_string()))
        .collect();

    write_json(&full_json_dir.join("notices.json"), &notices).await?;
    write_json(&full_json_dir.join("stats.json"), &stats).await?;
    write_json(&full_json_dir.join("failures.json"), &failures).await?;

    info!(
        cities = notices.len(),
        failures = failures.len(),
        "Wrote JSON output"
    );
    Ok(full_json_dir)
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).await?;
    info!(path = %path.display(), "Wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;
    use crate::models::NoticeRecord;
    use crate::stats::reduce_all;

    fn sample_report() -> AggregateReport {
        let mut report = AggregateReport::default();
        report.notices.insert(
            "Vyškov".to_string(),
            vec![NoticeRecord {
                title: "Oprava silnice".to_string(),
                posting_date: Some("2024-03-15".to_string()),
                document_description: "Vyhláška".to_string(),
                document_link: "https://example.cz/a.pdf".to_string(),
            }],
        );
        report
            .failures
            .insert("Znojmo".to_string(), FailureReason::NoNotices);
        report
    }

    #[tokio::test]
    async fn test_write_report_layout() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();
        let stats = reduce_all(&report.notices);
        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();

        let out = write_report(&report, &stats, dir.path(), date).await.unwrap();
        assert_eq!(out, dir.path().join("2025-05-06"));

        let notices: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("notices.json")).unwrap()).unwrap();
        assert_eq!(notices["Vyškov"][0]["title"], "Oprava silnice");

        let written: Vec<CityStatistics> =
            serde_json::from_str(&std::fs::read_to_string(out.join("stats.json")).unwrap()).unwrap();
        assert_eq!(written, stats);
        assert_eq!(written[0].earliest_date, NaiveDate::from_ymd_opt(2024, 3, 15));

        let failures: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(out.join("failures.json")).unwrap()).unwrap();
        assert_eq!(failures["Znojmo"], "feed contained no notices");
    }

    #[tokio::test]
    async fn test_rewrite_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();
        let stats = reduce_all(&report.notices);
        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();

        let out = write_report(&report, &stats, dir.path(), date).await.unwrap();
        let first = std::fs::read_to_string(out.join("notices.json")).unwrap();
        write_report(&report, &stats, dir.path(), date).await.unwrap();
        let second = std::fs::read_to_string(out.join("notices.json")).unwrap();
        assert_eq!(first, second);
    }
}
