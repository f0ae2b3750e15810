//! Crawl orchestration for the trademark portal
//!
//! This module contains the core crawling logic, including:
//! - Form configuration and search submission
//! - Result pagination and detail job discovery
//! - Field extraction from detail pages
//! - Overall run coordination

mod coordinator;
mod extractor;
mod form;
mod pagination;
mod queue;
mod search;

pub use coordinator::{run_harvest, Coordinator};
pub use extractor::{collapse_whitespace, extract_record};
pub use form::{configure_form, FormReport};
pub use pagination::{enabled_next_selector, walk_results, PaginationReport};
pub use queue::{CrawlJob, JobQueue};
pub use search::{classify_message, execute_search, SearchOutcome};

use crate::browser::BrowserError;
use crate::HarvestError;

/// Maps an exceeded wait bound to a step-scoped timeout
///
/// Other browser errors pass through unchanged.
pub(crate) fn step_error(step: &'static str) -> impl Fn(BrowserError) -> HarvestError {
    move |error| match error {
        BrowserError::TimedOut { after, .. } => HarvestError::StepTimeout { step, after },
        other => HarvestError::Browser(other),
    }
}
