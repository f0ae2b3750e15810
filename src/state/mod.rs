//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunPhase` / `RunState`: the orchestrator's phase and its form-filled flag
//! - `JobState`: the lifecycle of an individual detail job

mod job_state;
mod run_state;

// Re-export main types
pub use job_state::JobState;
pub use run_state::{RunPhase, RunState};
