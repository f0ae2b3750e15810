//! Job queue for the crawl orchestrator
//!
//! This module handles:
//! - The two job kinds (the single entry job and per-record detail jobs)
//! - FIFO ordering of pending jobs
//! - The global job ceiling that guarantees a run terminates

use std::collections::VecDeque;
use std::fmt;

/// A unit of work for the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlJob {
    /// Fill and submit the search form, then walk the results
    Entry,

    /// Extract one record from a detail page
    Detail { url: String },
}

impl CrawlJob {
    /// Label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Detail { .. } => "detail",
        }
    }
}

impl fmt::Display for CrawlJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Detail { url } => write!(f, "detail {}", url),
        }
    }
}

/// FIFO of pending jobs with a ceiling on how many jobs a run may ever accept
///
/// The ceiling counts every accepted job, including ones already processed,
/// so a portal that keeps producing links cannot keep a run alive forever.
#[derive(Debug)]
pub struct JobQueue {
    pending: VecDeque<CrawlJob>,
    accepted: usize,
    max_jobs: usize,
}

impl JobQueue {
    /// Creates an empty queue
    ///
    /// # Arguments
    ///
    /// * `max_jobs` - Total number of jobs the queue will accept over its lifetime
    pub fn new(max_jobs: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            accepted: 0,
            max_jobs,
        }
    }

    /// Appends a job
    ///
    /// # Returns
    ///
    /// `false` if the ceiling has been reached and the job was dropped
    pub fn push(&mut self, job: CrawlJob) -> bool {
        if self.accepted >= self.max_jobs {
            tracing::debug!("Job ceiling of {} reached, dropping {}", self.max_jobs, job);
            return false;
        }

        self.accepted += 1;
        self.pending.push_back(job);
        true
    }

    /// Takes the oldest pending job
    pub fn pop(&mut self) -> Option<CrawlJob> {
        self.pending.pop_front()
    }

    /// Number of jobs still waiting
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of jobs accepted so far
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}
