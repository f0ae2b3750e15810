//! Run-level state: the orchestrator's phase and the form-filled flag

use crate::HarvestError;
use std::fmt;

/// Phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Nothing has been dispatched yet
    Pending,

    /// The entry job is filling the form and submitting the search
    Searching,

    /// Result pages are being walked and detail jobs enqueued
    Paginating,

    /// Detail jobs are being processed
    Extracting,

    /// The job queue is exhausted
    Completed,

    /// A fatal error stopped the run
    Aborted,
}

impl RunPhase {
    /// Returns true once the run cannot make further progress
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    /// Returns true if the run may move from this phase to `next`
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        use RunPhase::*;

        if next == Aborted {
            return !self.is_finished();
        }

        matches!(
            (*self, next),
            (Pending, Searching)
                | (Searching, Paginating)
                | (Paginating, Extracting)
                | (Paginating, Completed)
                | (Extracting, Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Searching => "searching",
            Self::Paginating => "paginating",
            Self::Extracting => "extracting",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable state owned by one orchestrator instance for one run
#[derive(Debug, Clone)]
pub struct RunState {
    phase: RunPhase,
    form_filled: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Pending,
            form_filled: false,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// True once the entry job has completed its search step
    pub fn form_filled(&self) -> bool {
        self.form_filled
    }

    pub fn mark_form_filled(&mut self) {
        self.form_filled = true;
    }

    /// Moves to `next`, rejecting transitions the run cannot make
    pub fn transition(&mut self, next: RunPhase) -> Result<(), HarvestError> {
        if self.phase == next {
            return Ok(());
        }

        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!("Run phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
