//! Browser session layer
//!
//! This module handles:
//! - The [`BrowserSession`] boundary the crawl logic is written against
//! - Bounded condition waits and settle pauses
//! - A Chromium implementation for real runs
//! - An in-memory fixture implementation for tests (`fixture` feature)

mod chromium;
#[cfg(any(test, feature = "fixture"))]
mod fixture;
mod traits;
mod wait;

pub use chromium::ChromiumSession;
#[cfg(any(test, feature = "fixture"))]
pub use fixture::{FixtureEvent, FixtureSession};
pub use traits::{BrowserError, BrowserResult, BrowserSession, CheckboxState};
pub use wait::{bounded, settle, wait_for_any, wait_for_selector, WaitOutcome, POLL_INTERVAL};
