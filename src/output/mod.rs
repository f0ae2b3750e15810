//! Output module for persisting harvest results
//!
//! This module handles:
//! - Writing the record collection as JSON
//! - Recording and printing run statistics

mod json;
pub mod stats;

pub use json::write_records;
pub use stats::{print_statistics, CrawlStatistics};
