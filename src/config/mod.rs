//! Configuration module for tm-harvest
//!
//! Run options (search window and output path) come from the command line;
//! the portal layout, crawl bounds and wait bounds come from an optional TOML
//! file whose every key has a default.
//!
//! # Example
//!
//! ```no_run
//! use tm_harvest::config::{resolve_config, CrawlOptions};
//! use std::path::Path;
//!
//! let config = resolve_config(Some(Path::new("portal.toml")), None, false).unwrap();
//! let options = CrawlOptions::new("2024-01-01", "2024-01-31", "output.json").unwrap();
//! println!("Searching {} from {}", config.portal.search_url, options.start_date);
//! ```

mod options;
mod parser;
mod types;
mod validation;

// Re-export types
pub use options::{parse_date, CrawlOptions, DEFAULT_OUTPUT};
pub use types::{
    BrowserConfig, Config, CrawlerConfig, PortalConfig, TimeoutConfig, DEFAULT_SEARCH_URL,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, resolve_config};
pub use validation::validate;
