//! tm-harvest: a trademark register harvester
//!
//! This crate drives a browser session through a portal's advanced search form,
//! walks the paginated result listing, visits every detail page and extracts a
//! fixed set of labelled fields into [`record::TrademarkRecord`]s.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod state;

use std::time::Duration;
use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search aborted ({outcome}): {message}")]
    NonRetryableSearch {
        outcome: crawler::SearchOutcome,
        message: String,
    },

    #[error("Step '{step}' timed out after {after:?}")]
    StepTimeout { step: &'static str, after: Duration },

    #[error("No fields could be extracted from {url}")]
    ExtractionEmpty { url: String },

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid run transition: {from} -> {to}")]
    InvalidTransition {
        from: state::RunPhase,
        to: state::RunPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarvestError {
    /// Returns true if this error must abort the whole run regardless of
    /// which job raised it
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::NonRetryableSearch { .. } | Self::Io(_) | Self::Json(_)
        )
    }

    /// Returns true if this error came from an exceeded wait bound
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::StepTimeout { .. } | Self::Browser(browser::BrowserError::TimedOut { .. })
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Start date {start} is after end date {end}")]
    DateOrder {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlOptions};
pub use crawler::{Coordinator, CrawlJob, SearchOutcome};
pub use record::TrademarkRecord;
pub use state::{JobState, RunPhase};
