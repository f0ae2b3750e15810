/// Detail job state definitions for tracking extraction progress
///
/// A detail job is queued by the pagination walker, runs once, and ends in
/// exactly one terminal state.
use std::fmt;

/// Represents the current state of a detail job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobState {
    // ===== Active States =====
    /// Job is waiting in the queue
    Queued,

    /// Job is currently navigating or extracting
    Running,

    // ===== Terminal Success States =====
    /// A non-empty record was extracted and appended
    Extracted,

    // ===== Terminal Skip States =====
    /// The page rendered but no known field carried a value
    Empty,

    // ===== Terminal Error States =====
    /// A bounded wait on the detail page was exceeded
    TimedOut,

    /// Any other failure while handling the page
    Failed,
}

impl JobState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if the job may still be processed
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    /// Returns true if a record was produced
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::TimedOut | Self::Failed)
    }

    /// Returns true if a job may move from this state to `next`
    pub fn can_transition_to(&self, next: JobState) -> bool {
        match self {
            Self::Queued => next == Self::Running,
            Self::Running => next.is_terminal(),
            _ => false,
        }
    }

    /// Short lower-case name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Extracted => "extracted",
            Self::Empty => "empty",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        }
    }

    /// Returns all terminal states
    pub fn terminal_states() -> [Self; 4] {
        [Self::Extracted, Self::Empty, Self::TimedOut, Self::Failed]
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
