//! Browser session trait and error types
//!
//! This is the boundary to the browser-automation engine. The crawl logic only
//! ever talks to a [`BrowserSession`]; how pages are rendered is up to the
//! implementation.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a browser session
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to start browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("No element matches '{0}'")]
    ElementNotFound(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Timed out waiting for {what} after {after:?}")]
    TimedOut { what: String, after: Duration },

    #[error("Browser session is closed")]
    Closed,
}

/// Result type for browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Current state of a checkbox on the rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxState {
    /// The checkbox element id
    pub id: String,

    /// Live `checked` property (not the initial attribute)
    pub checked: bool,
}

/// A single browser tab the crawler drives
///
/// All methods take `&self`; implementations serialize access internally.
/// A session performs at most one navigation at a time.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigates to `url` and waits for the load event
    async fn goto(&self, url: &str) -> BrowserResult<()>;

    /// Returns the URL of the current document, if any
    async fn current_url(&self) -> BrowserResult<Option<String>>;

    /// Waits until the page has stopped issuing network requests
    ///
    /// Returns `BrowserError::TimedOut` if the page is still busy after `bound`.
    async fn wait_for_network_idle(&self, bound: Duration) -> BrowserResult<()>;

    /// Counts the elements matching `selector`
    async fn count(&self, selector: &str) -> BrowserResult<usize>;

    /// Returns the serialized DOM of the current document
    async fn content(&self) -> BrowserResult<String>;

    /// Returns the id and live checked state of every checkbox matching `selector`
    async fn checkboxes(&self, selector: &str) -> BrowserResult<Vec<CheckboxState>>;

    /// Clicks the first element matching `selector`
    ///
    /// Returns `Ok(false)` when nothing matches.
    async fn click(&self, selector: &str) -> BrowserResult<bool>;

    /// Clicks the nearest ancestor matching `ancestor` of the first element
    /// matching `selector`
    ///
    /// Returns `Ok(false)` when either element cannot be located.
    async fn click_enclosing(&self, selector: &str, ancestor: &str) -> BrowserResult<bool>;

    /// Clicks `selector` and waits for the navigation it triggers
    ///
    /// Returns once a new document has loaded. Both the click and the
    /// navigation must complete within `bound`.
    async fn click_and_wait_for_navigation(
        &self,
        selector: &str,
        bound: Duration,
    ) -> BrowserResult<()>;

    /// Selects the whole value of the input and deletes it
    ///
    /// The input is expected to hold focus from a preceding `click`; it is not
    /// clicked again.
    async fn clear_input(&self, selector: &str) -> BrowserResult<()>;

    /// Types `text` into the focused input one character at a time
    async fn type_text(&self, selector: &str, text: &str, key_delay: Duration)
        -> BrowserResult<()>;

    /// Returns attribute `attr` of every element matching `selector`
    ///
    /// Elements without the attribute are skipped. URL-valued attributes are
    /// returned absolute.
    async fn attribute_all(&self, selector: &str, attr: &str) -> BrowserResult<Vec<String>>;
}
