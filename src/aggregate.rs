//! Concurrent fetch-and-extract over the whole endpoint table.
//!
//! Every city with an endpoint becomes one future that fetches its feed and
//! extracts notices. At most `workers` of them run at once
//! (`buffer_unordered`), and a single collecting loop drains them in
//! completion order into the [`AggregateReport`]. Workers share nothing but
//! the read-only [`EndpointFetcher`].

use crate::config::{DEFAULT_WORKERS, Settings};
use crate::error::{ConfigError, FailureReason};
use crate::extract::{DocumentPolicy, extract_notices};
use crate::fetch::EndpointFetcher;
use crate::models::{AggregateReport, NoticeRecord};
use crate::progress::Progress;
use crate::table::EndpointTable;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct Aggregator {
    fetcher: Arc<EndpointFetcher>,
    workers: usize,
    deadline: Option<Duration>,
    policy: DocumentPolicy,
}

#[derive(Debug, Clone, Copy)]
enum Interrupt {
    Deadline,
    Shutdown,
}

impl Interrupt {
    fn reason(self) -> FailureReason {
        match self {
            Interrupt::Deadline => FailureReason::DeadlineExceeded,
            Interrupt::Shutdown => FailureReason::Cancelled,
        }
    }
}

impl Aggregator {
    pub fn new(fetcher: EndpointFetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            workers: DEFAULT_WORKERS,
            deadline: None,
            policy: DocumentPolicy::default(),
        }
    }

    /// Build the fetcher and aggregator described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(EndpointFetcher::new(&settings.fetch)?)
            .with_workers(settings.workers)
            .with_deadline(settings.deadline())
            .with_document_policy(settings.document_policy))
    }

    /// Cap on concurrently running fetches. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Overall deadline for a run; outstanding fetches are dropped when it passes.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_document_policy(mut self, policy: DocumentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch and extract every city in `table`.
    pub async fn aggregate<P>(&self, table: &EndpointTable, progress: &P) -> AggregateReport
    where
        P: Progress + ?Sized,
    {
        self.aggregate_until(table, progress, std::future::pending::<()>())
            .await
    }

    /// Like [`Aggregator::aggregate`], but stops early when `shutdown` resolves.
    ///
    /// Cities still in flight when the deadline passes or `shutdown` resolves
    /// are dropped and reported in `failures`; finished cities are kept.
    #[instrument(level = "info", skip_all, fields(workers = self.workers))]
    pub async fn aggregate_until<P, F>(
        &self,
        table: &EndpointTable,
        progress: &P,
        shutdown: F,
    ) -> AggregateReport
    where
        P: Progress + ?Sized,
        F: Future<Output = ()>,
    {
        let jobs: Vec<(String, String)> = table
            .with_endpoint()
            .map(|(city, endpoint)| (city.to_string(), endpoint.to_string()))
            .collect();
        let total = jobs.len();
        info!(
            total,
            skipped = table.len() - total,
            "Fetching notice boards"
        );
        progress.started(total);

        let t0 = Instant::now();
        // Keyed by row so a city listed twice stays pending until both rows finish.
        let mut pending: HashMap<usize, String> = jobs
            .iter()
            .enumerate()
            .map(|(row, (city, _))| (row, city.clone()))
            .collect();
        let mut report = AggregateReport::default();
        let policy = self.policy;

        let mut outcomes = stream::iter(jobs.into_iter().enumerate())
            .map(|(row, (city, endpoint))| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    let outcome = collect_city(&fetcher, &endpoint, policy).await;
                    (row, city, outcome)
                }
            })
            .buffer_unordered(self.workers);

        let mut deadline = pin!(sleep_or_forever(self.deadline));
        let mut shutdown = pin!(shutdown);

        let interrupted = loop {
            tokio::select! {
                next = outcomes.next() => match next {
                    Some((row, city, outcome)) => {
                        match &outcome {
                            Ok(records) => debug!(%city, notices = records.len(), "City collected"),
                            Err(e) => warn!(%city, error = %e, "City skipped"),
                        }
                        pending.remove(&row);
                        progress.advanced(&city);
                        report.record(city, outcome);
                    }
                    None => break None,
                },
                () = &mut deadline => break Some(Interrupt::Deadline),
                () = &mut shutdown => break Some(Interrupt::Shutdown),
            }
        };
        drop(outcomes);

        if let Some(interrupt) = interrupted {
            warn!(outstanding = pending.len(), ?interrupt, "Aggregation interrupted");
            for city in pending.into_values() {
                report.record(city, Err(interrupt.reason()));
            }
        }
        progress.finished();

        let elapsed = t0.elapsed();
        info!(
            succeeded = report.notices.len(),
            failed = report.failures.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Aggregation complete"
        );
        report
    }
}

async fn sleep_or_forever(deadline: Option<Duration>) {
    match deadline {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

async fn collect_city(
    fetcher: &EndpointFetcher,
    endpoint: &str,
    policy: DocumentPolicy,
) -> Result<Vec<NoticeRecord>, FailureReason> {
    let records = match fetcher.try_fetch(endpoint).await? {
        Some(payload) => extract_notices(&payload, policy),
        None => Vec::new(),
    };
    if records.is_empty() {
        Err(FailureReason::NoNotices)
    } else {
        Ok(records)
    }
}
