//! Search Executor
//!
//! Submits the configured search form and classifies what the portal shows
//! back: a results table, or an informational message explaining why there
//! is none.

use crate::browser::{wait_for_any, wait_for_selector, BrowserSession, WaitOutcome};
use crate::config::{Config, CrawlOptions, PortalConfig};
use crate::crawler::extractor::collapse_whitespace;
use crate::crawler::form::{configure_form, FormReport};
use crate::crawler::step_error;
use crate::HarvestError;
use scraper::{Html, Selector};
use std::fmt;

const NO_RESULTS: &str = "no results found";
const TOO_MANY_RESULTS: &str = "too many results found";

/// Classified result of one search submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchOutcome {
    /// A results table is present; pagination can proceed
    Success,

    /// The portal reported no matches
    NoResults,

    /// The portal refused to list the matches
    TooManyResults,

    /// Neither a results table nor a message appeared in time
    Unrecognized,
}

impl SearchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoResults => "no_results",
            Self::TooManyResults => "too_many_results",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies an informational message shown after a search
///
/// The text is lower-cased and trimmed before matching. A message that
/// mentions neither known condition counts as success.
pub fn classify_message(message: &str) -> SearchOutcome {
    let normalized = message.trim().to_lowercase();

    if normalized.contains(NO_RESULTS) {
        SearchOutcome::NoResults
    } else if normalized.contains(TOO_MANY_RESULTS) {
        SearchOutcome::TooManyResults
    } else {
        SearchOutcome::Success
    }
}

/// Fills the form on the current page, submits it and classifies the result
///
/// On success the session is left on the first results page.
///
/// # Returns
///
/// * `Ok(FormReport)` - The search succeeded; what the form configurator changed
/// * `Err(HarvestError::NonRetryableSearch)` - No results, too many results or
///   an unrecognized response
/// * `Err(HarvestError::StepTimeout)` - The form or the submission did not
///   respond within its bound
pub async fn execute_search<S>(
    session: &S,
    config: &Config,
    options: &CrawlOptions,
) -> Result<FormReport, HarvestError>
where
    S: BrowserSession + ?Sized,
{
    let portal = &config.portal;
    let timeouts = &config.timeouts;

    if let Err(e) = session.wait_for_network_idle(timeouts.network_idle()).await {
        tracing::warn!("Search page did not go idle: {}", e);
    }

    wait_for_selector(session, &portal.date_range_container, timeouts.element())
        .await
        .map_err(step_error("date range container"))?;

    let report = configure_form(session, config, options).await?;

    tracing::info!(
        "Submitting search for {} .. {}",
        options.start_date,
        options.end_date
    );
    session
        .click_and_wait_for_navigation(&portal.submit_button, timeouts.navigation())
        .await
        .map_err(step_error("search submission"))?;

    let selectors = [portal.results_table.as_str(), portal.info_message.as_str()];
    let outcome = match wait_for_any(session, &selectors, timeouts.search_result()).await? {
        WaitOutcome::Matched(_) => classify_page(session, portal).await?,
        WaitOutcome::TimedOut => {
            return Err(HarvestError::NonRetryableSearch {
                outcome: SearchOutcome::Unrecognized,
                message: format!(
                    "neither results nor a message appeared within {:?}",
                    timeouts.search_result()
                ),
            });
        }
    };

    match outcome {
        (SearchOutcome::Success, _) => {
            tracing::info!("Search returned results");
            Ok(report)
        }
        (outcome, message) => Err(HarvestError::NonRetryableSearch { outcome, message }),
    }
}

/// Reads the informational message, if any, and classifies it
async fn classify_page<S>(
    session: &S,
    portal: &PortalConfig,
) -> Result<(SearchOutcome, String), HarvestError>
where
    S: BrowserSession + ?Sized,
{
    if session.count(&portal.info_message).await? == 0 {
        return Ok((SearchOutcome::Success, String::new()));
    }

    let html = session.content().await?;
    let message = message_text(&html, &portal.info_message)?;
    tracing::debug!("Portal message: {}", message);

    Ok((classify_message(&message), message))
}

fn message_text(html: &str, selector: &str) -> Result<String, HarvestError> {
    let selector = Selector::parse(selector)
        .map_err(|e| HarvestError::Selector(format!("{}: {:?}", selector, e)))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
        .unwrap_or_default())
}
