//! Field Extractor
//!
//! Maps label/value cell pairs of a rendered detail table onto a
//! [`TrademarkRecord`]. Label text is matched against the ordered label table
//! by substring containment; the value prefers a highlighted inner span over
//! the raw cell text.

use crate::config::PortalConfig;
use crate::record::{match_label, TrademarkRecord};
use crate::{HarvestError, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Extracts a record from the serialized DOM of a detail page
///
/// Unknown labels are ignored. A known label whose value resolves to an empty
/// string is recorded as an explicit null. If the same field occurs in more
/// than one row, the later row wins.
///
/// # Arguments
///
/// * `html` - The rendered page content
/// * `portal` - Selectors for the detail table, label cells and highlights
///
/// # Returns
///
/// * `Ok(TrademarkRecord)` - The extracted record (possibly empty)
/// * `Err(HarvestError::Selector)` - A configured selector did not parse
pub fn extract_record(html: &str, portal: &PortalConfig) -> Result<TrademarkRecord> {
    let table_selector = parse_selector(&portal.detail_table)?;
    let cell_selector = parse_selector("td")?;
    let highlight_selector = parse_selector(&portal.highlight_selector)?;

    let document = Html::parse_document(html);
    let mut record = TrademarkRecord::new();
    let mut seen = HashSet::new();

    for table in document.select(&table_selector) {
        for cell in table.select(&cell_selector) {
            // Nested tables would otherwise yield the same cell twice
            if !seen.insert(cell.id()) {
                continue;
            }

            if !cell.value().classes().any(|c| c == portal.label_cell_class) {
                continue;
            }

            let Some(value_cell) = next_cell(cell) else {
                continue;
            };

            let label = collapse_whitespace(&cell.text().collect::<String>());
            let Some(field) = match_label(&label) else {
                tracing::trace!("Ignoring unknown label '{}'", label);
                continue;
            };

            let value = resolve_value(value_cell, &highlight_selector);
            tracing::trace!("{} = {:?}", field, value);
            record.set(field, &value);
        }
    }

    Ok(record)
}

/// Returns the element immediately following `cell` if it is a `td`
fn next_cell(cell: ElementRef<'_>) -> Option<ElementRef<'_>> {
    cell.next_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .filter(|sibling| sibling.value().name() == "td")
}

/// Prefers the first non-empty highlighted span, then the whole cell text
fn resolve_value(cell: ElementRef<'_>, highlight: &Selector) -> String {
    cell.select(highlight)
        .map(|span| collapse_whitespace(&span.text().collect::<String>()))
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| collapse_whitespace(&cell.text().collect::<String>()))
}

/// Trims and collapses runs of whitespace into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector(format!("{}: {:?}", selector, e)))
}
