//! Run statistics
//!
//! This module provides the counters a harvest run keeps while it works and
//! the console summary printed once it ends.

use crate::state::{JobState, RunPhase};
use std::collections::HashMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Result pages whose links were read
    pub pages_walked: usize,

    /// Detail jobs processed
    pub detail_jobs: usize,

    /// Count of detail jobs by terminal state
    pub details_by_state: HashMap<JobState, usize>,

    /// Records written to the collection
    pub records: usize,

    /// Checkboxes that needed a change but had no clickable box
    pub checkboxes_skipped: usize,

    /// True if pagination stopped at a ceiling rather than the last page
    pub truncated: bool,

    /// Phase the run ended in
    pub phase: RunPhase,

    /// Why the run aborted, if it did
    pub abort_reason: Option<String>,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self {
            pages_walked: 0,
            detail_jobs: 0,
            details_by_state: HashMap::new(),
            records: 0,
            checkboxes_skipped: 0,
            truncated: false,
            phase: RunPhase::Pending,
            abort_reason: None,
            duration: Duration::ZERO,
        }
    }

    /// Counts one finished detail job
    pub fn record_detail(&mut self, state: JobState) {
        self.detail_jobs += 1;
        *self.details_by_state.entry(state).or_insert(0) += 1;
    }

    /// Number of detail jobs that ended in `state`
    pub fn count(&self, state: JobState) -> usize {
        self.details_by_state.get(&state).copied().unwrap_or(0)
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Outcome: {}", stats.phase);
    if let Some(reason) = &stats.abort_reason {
        println!("  Abort reason: {}", reason);
    }
    println!("  Duration: {:.1}s", stats.duration.as_secs_f64());
    println!("  Result pages walked: {}", stats.pages_walked);
    if stats.truncated {
        println!("  Pagination stopped at a configured ceiling");
    }
    println!("  Records collected: {}", stats.records);
    println!();

    if stats.detail_jobs > 0 {
        println!("Detail Jobs by State:");
        for state in JobState::terminal_states() {
            let count = stats.count(state);
            let percentage = (count as f64 / stats.detail_jobs as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", state, count, percentage);
        }
        println!();
    }

    if stats.checkboxes_skipped > 0 {
        println!(
            "Warning: {} search checkbox(es) could not be set",
            stats.checkboxes_skipped
        );
        println!();
    }

    let extracted = stats.count(JobState::Extracted);
    let success_rate = if stats.detail_jobs > 0 {
        (extracted as f64 / stats.detail_jobs as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} detail pages extracted)",
        success_rate, extracted, stats.detail_jobs
    );
}
