//! Pagination Walker
//!
//! Enqueues every row link on the current results page, then advances
//! through the paginator until its "next" control is missing or disabled.

use crate::browser::{settle, BrowserSession};
use crate::config::{Config, PortalConfig};
use crate::crawler::queue::{CrawlJob, JobQueue};
use crate::HarvestError;

/// What a pagination walk covered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationReport {
    /// Result pages whose links were read
    pub pages: usize,

    /// Detail jobs enqueued
    pub links: usize,

    /// True if the walk stopped at a ceiling rather than the last page
    pub truncated: bool,
}

/// Selector for a "next page" control that can still be used
pub fn enabled_next_selector(portal: &PortalConfig) -> String {
    format!(
        "{}:not(.{}):not([disabled])",
        portal.next_page, portal.next_page_disabled_class
    )
}

/// Walks the result pages starting from the current one
///
/// Duplicate links are enqueued as-is. The walk ends normally when no enabled
/// "next" control is present, and early when `max-pages` is reached or the
/// queue refuses a job.
pub async fn walk_results<S>(
    session: &S,
    config: &Config,
    queue: &mut JobQueue,
) -> Result<PaginationReport, HarvestError>
where
    S: BrowserSession + ?Sized,
{
    let portal = &config.portal;
    let next = enabled_next_selector(portal);
    let mut report = PaginationReport::default();

    loop {
        report.pages += 1;

        let links = session.attribute_all(&portal.result_links, "href").await?;
        tracing::debug!("Result page {}: {} link(s)", report.pages, links.len());

        for url in links {
            if !queue.push(CrawlJob::Detail { url }) {
                tracing::warn!(
                    "Job ceiling reached ({} jobs accepted) on result page {}, stopping pagination",
                    queue.accepted(),
                    report.pages
                );
                report.truncated = true;
                return Ok(report);
            }
            report.links += 1;
        }

        if let Some(max_pages) = config.crawler.max_pages {
            if report.pages >= max_pages {
                if session.count(&next).await? > 0 {
                    tracing::warn!("Stopping after max-pages ({}) result pages", max_pages);
                    report.truncated = true;
                }
                return Ok(report);
            }
        }

        if !session.click(&next).await? {
            tracing::debug!("No enabled next page control, pagination complete");
            return Ok(report);
        }

        settle(config.crawler.page_settle()).await;
    }
}
