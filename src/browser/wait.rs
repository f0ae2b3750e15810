//! Bounded condition waits
//!
//! Every wait the crawler performs carries an explicit upper bound and reports
//! a timeout as a distinct outcome rather than hanging.

use crate::browser::{BrowserError, BrowserResult, BrowserSession};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

/// How often a condition wait re-queries the page
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of a bounded condition wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The selector at this index matched first
    Matched(usize),

    /// No selector matched within the bound
    TimedOut,
}

/// Waits until any of `selectors` matches at least one element
///
/// Selectors are checked in order on each poll, so when several match at
/// once the lowest index wins. A script error means the document is being
/// replaced and counts as no match; other errors end the wait.
pub async fn wait_for_any<S>(
    session: &S,
    selectors: &[&str],
    bound: Duration,
) -> BrowserResult<WaitOutcome>
where
    S: BrowserSession + ?Sized,
{
    let deadline = Instant::now() + bound;

    loop {
        for (index, selector) in selectors.iter().enumerate() {
            match session.count(selector).await {
                Ok(found) if found > 0 => return Ok(WaitOutcome::Matched(index)),
                Ok(_) => {}
                Err(BrowserError::Script(message)) => {
                    tracing::trace!("Query for {} failed while waiting: {}", selector, message);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(WaitOutcome::TimedOut);
        }

        sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

/// Waits until `selector` matches, failing with `BrowserError::TimedOut`
pub async fn wait_for_selector<S>(session: &S, selector: &str, bound: Duration) -> BrowserResult<()>
where
    S: BrowserSession + ?Sized,
{
    match wait_for_any(session, &[selector], bound).await? {
        WaitOutcome::Matched(_) => Ok(()),
        WaitOutcome::TimedOut => Err(BrowserError::TimedOut {
            what: selector.to_string(),
            after: bound,
        }),
    }
}

/// Runs `fut` under `bound`, mapping an elapsed bound to `BrowserError::TimedOut`
pub async fn bounded<T, F>(what: &str, bound: Duration, fut: F) -> BrowserResult<T>
where
    F: Future<Output = BrowserResult<T>>,
{
    match timeout(bound, fut).await {
        Ok(result) => result,
        Err(_) => Err(BrowserError::TimedOut {
            what: what.to_string(),
            after: bound,
        }),
    }
}

/// Settle pause after a UI action
pub async fn settle(pause: Duration) {
    if !pause.is_zero() {
        sleep(pause).await;
    }
}
