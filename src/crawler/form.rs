//! Form Configurator
//!
//! Brings the advanced search form into its target state:
//! - Checkboxes on the allow-list end up checked, every other one unchecked
//! - Both date-range inputs hold the run's dates
//!
//! NOTE: the run's start date is typed into the portal's "date to" input and
//! the end date into "date from". The portal has always been driven this way;
//! keep the swap until its field semantics are confirmed against the live
//! site.

use crate::browser::{settle, BrowserError, BrowserSession};
use crate::config::{Config, CrawlOptions};
use crate::{ConfigError, HarvestError};
use chrono::NaiveDate;
use std::fmt::Write;

/// What the configurator changed on the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormReport {
    /// Checkbox ids whose state was flipped
    pub toggled: Vec<String>,

    /// Checkbox ids that needed a change but had no clickable proxy
    pub skipped: Vec<String>,
}

/// Configures checkboxes and date inputs on the current page
///
/// A checkbox whose proxy element cannot be located is skipped with a warning.
/// Missing date inputs fail the step.
pub async fn configure_form<S>(
    session: &S,
    config: &Config,
    options: &CrawlOptions,
) -> Result<FormReport, HarvestError>
where
    S: BrowserSession + ?Sized,
{
    let report = configure_checkboxes(session, config).await?;

    // Swapped on purpose, see module docs
    let start = format_date(options.start_date, &config.portal.date_format)?;
    let end = format_date(options.end_date, &config.portal.date_format)?;
    fill_date(session, config, &config.portal.date_to_input, &start).await?;
    fill_date(session, config, &config.portal.date_from_input, &end).await?;

    tracing::debug!(
        "Form configured: {} checkbox(es) toggled, {} skipped, dates {} .. {}",
        report.toggled.len(),
        report.skipped.len(),
        start,
        end
    );

    Ok(report)
}

async fn configure_checkboxes<S>(session: &S, config: &Config) -> Result<FormReport, HarvestError>
where
    S: BrowserSession + ?Sized,
{
    let portal = &config.portal;
    let mut report = FormReport::default();

    let ids: Vec<String> = session
        .checkboxes(&portal.checkbox_selector)
        .await?
        .into_iter()
        .map(|state| state.id)
        .collect();

    for id in ids {
        let selector = id_selector(&id);

        // Re-read: an earlier click may have changed dependent boxes
        let Some(current) = session.checkboxes(&selector).await?.into_iter().next() else {
            continue;
        };

        let wanted = portal.checked_boxes.iter().any(|allowed| allowed == &id);
        if current.checked == wanted {
            tracing::trace!("Checkbox {} already {}", id, state_name(wanted));
            continue;
        }

        if session.click_enclosing(&selector, &portal.checkbox_proxy).await? {
            tracing::trace!("Checkbox {} -> {}", id, state_name(wanted));
            report.toggled.push(id);
            settle(config.crawler.checkbox_settle()).await;
        } else {
            tracing::warn!("No clickable box for checkbox {}, leaving it {}", id, state_name(current.checked));
            report.skipped.push(id);
        }
    }

    Ok(report)
}

/// Clicks into a date input, clears it and types `value` one key at a time
async fn fill_date<S>(session: &S, config: &Config, selector: &str, value: &str) -> Result<(), HarvestError>
where
    S: BrowserSession + ?Sized,
{
    if !session.click(selector).await? {
        return Err(BrowserError::ElementNotFound(selector.to_string()).into());
    }

    session.clear_input(selector).await?;
    session
        .type_text(selector, value, config.crawler.key_delay())
        .await?;
    settle(config.crawler.input_settle()).await;

    tracing::trace!("Typed {} into {}", value, selector);
    Ok(())
}

fn format_date(date: NaiveDate, format: &str) -> Result<String, HarvestError> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).map_err(|_| {
        ConfigError::Validation(format!("date-format '{}' cannot format {}", format, date))
    })?;
    Ok(out)
}

/// Attribute selector for an element id, safe for ids CSS would reject
fn id_selector(id: &str) -> String {
    format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""))
}

fn state_name(checked: bool) -> &'static str {
    if checked {
        "checked"
    } else {
        "unchecked"
    }
}
