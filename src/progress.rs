//! Progress reporting for aggregation runs.
//!
//! Progress is a side channel: the aggregator calls into a [`Progress`]
//! implementation as cities complete, but nothing it reports is part of the
//! aggregation result.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives progress events from the aggregator's collecting loop.
pub trait Progress: Send + Sync {
    /// Called once, before any work completes, with the number of cities submitted.
    fn started(&self, total: usize);
    /// Called once per city whose fetch and extraction completed.
    fn advanced(&self, city: &str);
    /// Called once when the run ends, including on deadline or cancellation.
    fn finished(&self);
}

/// Ignores all progress events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn started(&self, _total: usize) {}
    fn advanced(&self, _city: &str) {}
    fn finished(&self) {}
}

/// Counts completed cities against the submitted total.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    total: AtomicUsize,
    completed: AtomicUsize,
}

impl ProgressCounter {
    /// `(completed, total)` as of now.
    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.completed.load(Ordering::Acquire),
            self.total.load(Ordering::Acquire),
        )
    }
}

impl Progress for ProgressCounter {
    fn started(&self, total: usize) {
        self.completed.store(0, Ordering::Release);
        self.total.store(total, Ordering::Release);
    }

    fn advanced(&self, _city: &str) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    fn finished(&self) {}
}

/// Terminal progress bar for the command-line runner.
impl Progress for ProgressBar {
    fn started(&self, total: usize) {
        self.set_length(total as u64);
        self.set_position(0);
    }

    fn advanced(&self, city: &str) {
        self.set_message(city.to_string());
        self.inc(1);
    }

    fn finished(&self) {
        self.finish_and_clear();
    }
}

/// Progress bar styled for city downloads; its length is set by `started`.
pub fn city_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_tracks_completion() {
        let counter = ProgressCounter::default();
        counter.started(3);
        counter.advanced("Benešov");
        counter.advanced("Beroun");
        assert_eq!(counter.snapshot(), (2, 3));
    }

    #[test]
    fn test_counter_resets_on_restart() {
        let counter = ProgressCounter::default();
        counter.started(2);
        counter.advanced("Benešov");
        counter.started(5);
        assert_eq!(counter.snapshot(), (0, 5));
    }

    #[test]
    fn test_progress_bar_advances() {
        let pb = ProgressBar::hidden();
        Progress::started(&pb, 4);
        Progress::advanced(&pb, "Kladno");
        assert_eq!(pb.position(), 1);
        assert_eq!(pb.length(), Some(4));
    }
}
