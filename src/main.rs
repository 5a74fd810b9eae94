//! # uredni_desky
//!
//! Batch runner: fetch every city's notice board feed, compute per-city
//! statistics and write JSON for the dashboard.
//!
//! ## Usage
//!
//! ```sh
//! uredni_desky -e data/mesta.csv -j ./json
//! ```
//!
//! ## Pipeline
//!
//! 1. **Table**: load the city → endpoint CSV
//! 2. **Aggregate**: fetch and extract every feed (bounded concurrency)
//! 3. **Reduce**: per-city statistics
//! 4. **Output**: `notices.json`, `stats.json`, `failures.json`

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use uredni_desky::outputs::json;
use uredni_desky::progress::city_progress_bar;
use uredni_desky::stats::reduce_all;
use uredni_desky::utils::ensure_writable_dir;
use uredni_desky::{Aggregator, EndpointTable};

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("uredni_desky starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = args.settings()?;
    info!(
        workers = settings.workers,
        timeout_secs = settings.fetch.timeout_secs,
        deadline_secs = ?settings.deadline_secs,
        document_policy = ?settings.document_policy,
        "Resolved settings"
    );

    // Early check: ensure JSON output dir is writable
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir.display(),
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let table = EndpointTable::from_path(&args.endpoints)?;
    let aggregator = Aggregator::from_settings(&settings)?;

    // ---- Fetch and extract ----
    let progress = city_progress_bar();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C; running without cancellation");
            std::future::pending::<()>().await;
        }
        warn!("Ctrl-C received; cancelling outstanding fetches");
    };
    let report = aggregator.aggregate_until(&table, &progress, shutdown).await;

    // ---- Reduce ----
    let stats = reduce_all(&report.notices);
    for city in &stats {
        info!(
            city = %city.city,
            total = city.total_count,
            avg_monthly_frequency = city.avg_monthly_frequency,
            keyword = city.dominant_keyword.as_deref().unwrap_or("-"),
            earliest = ?city.earliest_date,
            "City statistics"
        );
    }

    // ---- Output ----
    let date = Local::now().date_naive();
    if let Err(e) = json::write_report(&report, &stats, &args.json_output_dir, date).await {
        error!(error = %e, "Failed to write JSON output");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        cities = report.notices.len(),
        failed = report.failures.len(),
        "Execution complete"
    );

    Ok(())
}
