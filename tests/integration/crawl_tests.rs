//! Integration tests for the harvester
//!
//! These tests drive the `Coordinator` against synthetic portals served by
//! `FixtureSession` and check the full search -> pagination -> extraction
//! cycle end-to-end.

use crate::portal::*;
use std::fs;
use tempfile::TempDir;
use tm_harvest::browser::FixtureEvent;
use tm_harvest::config::CrawlOptions;
use tm_harvest::crawler::Coordinator;
use tm_harvest::record::RecordField;
use tm_harvest::state::{JobState, RunPhase};
use tm_harvest::{ConfigError, HarvestError, SearchOutcome};

fn options(dir: &TempDir) -> CrawlOptions {
    CrawlOptions::new("2024-01-01", "2024-01-31", dir.path().join("output.json")).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_two_pages_produce_four_records() {
    let dir = TempDir::new().unwrap();
    let config = config();
    let session = two_page_portal(&config);

    let mut coordinator = Coordinator::new(session.clone(), config, options(&dir));
    let stats = coordinator.run_to_file().await.unwrap();

    assert_eq!(stats.phase, RunPhase::Completed);
    assert_eq!(stats.pages_walked, 2);
    assert_eq!(stats.detail_jobs, 4);
    assert_eq!(stats.records, 4);
    assert_eq!(stats.count(JobState::Extracted), 4);
    assert!(!stats.truncated);

    let records = coordinator.records();
    assert_eq!(records.len(), 4);
    for record in &records {
        assert!(record.populated_count() >= 1);
        assert_eq!(record.get(RecordField::TrademarkType), Some(None));
    }
    assert_eq!(records[0].get(RecordField::NameTitle), Some(Some("MARK 1")));

    let written = fs::read_to_string(dir.path().join("output.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 4);
    assert_eq!(array[3]["nameTitle"], "MARK 4");
    assert_eq!(array[3]["applicationNumber"], "Z-4");
    assert!(array[3]["trademarkType"].is_null());
    assert!(array[3].get("registrationNumber").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_search_form_is_configured_before_submission() {
    let dir = TempDir::new().unwrap();
    let config = config();
    let session = two_page_portal(&config);

    let mut coordinator = Coordinator::new(session.clone(), config, options(&dir));
    coordinator.run().await.unwrap();

    assert_eq!(session.is_checked("ipType_trademark"), Some(true));
    assert_eq!(session.is_checked("ipType_patent"), Some(false));
    assert_eq!(session.is_checked("status_registered"), Some(true));
    assert_eq!(session.is_checked("status_filed"), Some(true));

    let visits = session.visits();
    assert_eq!(visits[0], SEARCH_URL);
    assert_eq!(visits[1], results_url(1));
    assert_eq!(visits[2], results_url(2));
    assert_eq!(visits.len(), 2 + 1 + 4);
}

#[tokio::test(start_paused = true)]
async fn test_start_date_is_typed_into_date_to() {
    let dir = TempDir::new().unwrap();
    let config = config();
    let session = two_page_portal(&config);

    let mut coordinator = Coordinator::new(session.clone(), config, options(&dir));
    coordinator.run().await.unwrap();

    assert_eq!(
        session.input_value("#dateTo_input").as_deref(),
        Some("2024-01-01")
    );
    assert_eq!(
        session.input_value("#dateFrom_input").as_deref(),
        Some("2024-01-31")
    );

    let typed: Vec<(String, String)> = session
        .events()
        .into_iter()
        .filter_map(|event| match event {
            FixtureEvent::Type { selector, text } => Some((selector, text)),
            _ => None,
        })
        .collect();

    assert_eq!(
        typed,
        vec![
            ("#dateTo_input".to_string(), "2024-01-01".to_string()),
            ("#dateFrom_input".to_string(), "2024-01-31".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_results_aborts_and_flushes() {
    let dir = TempDir::new().unwrap();
    let config = config();
    let session = portal_with_results(&config, &message_page("No results found for your query"));

    let mut coordinator = Coordinator::new(session, config, options(&dir));
    let result = coordinator.run_to_file().await;

    match result {
        Err(HarvestError::NonRetryableSearch { outcome, message }) => {
            assert_eq!(outcome, SearchOutcome::NoResults);
            assert!(message.contains("No results found"));
        }
        other => panic!("expected NoResults abort, got {:?}", other),
    }

    assert_eq!(coordinator.phase(), RunPhase::Aborted);
    assert!(coordinator.statistics().abort_reason.is_some());

    let written = fs::read_to_string(dir.path().join("output.json")).unwrap();
    assert_eq!(written.trim(), "[]");
}

#[tokio::test(start_paused = true)]
async fn test_too_many_results_aborts() {
    let dir = TempDir::new().unwrap();
    let config = config();
    let session = portal_with_results(
        &config,
        &message_page("Too many results found, please narrow your search criteria"),
    );

    let mut coordinator = Coordinator::new(session, config, options(&dir));
    let result = coordinator.run().await;

    let error = result.unwrap_err();
    assert!(error.is_fatal());
    assert!(matches!(
        error,
        HarvestError::NonRetryableSearch {
            outcome: SearchOutcome::TooManyResults,
            ..
        }
    ));
    assert_eq!(coordinator.phase(), RunPhase::Aborted);
    assert!(coordinator.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_detail_failures_do_not_abort_run() {
    let dir = TempDir::new().unwrap();
    let mut config = config();
    config.timeouts.detail_secs = 5;

    let session = portal_with_results(&config, &results_page(&["ok", "empty", "broken", "gone"], false));
    session.add_page(&detail_url("ok"), &detail_page(&[("Status", "Filed")]));
    session.add_page(&detail_url("empty"), &detail_page(&[("Owner", "Nobody")]));
    session.add_page(&detail_url("broken"), "<html><body><p>Internal error</p></body></html>");
    // "gone" has no page at all, so navigation fails

    let mut coordinator = Coordinator::new(session, config, options(&dir));
    let stats = coordinator.run_to_file().await.unwrap();

    assert_eq!(stats.phase, RunPhase::Completed);
    assert_eq!(stats.detail_jobs, 4);
    assert_eq!(stats.count(JobState::Extracted), 1);
    assert_eq!(stats.count(JobState::Empty), 1);
    assert_eq!(stats.count(JobState::TimedOut), 1);
    assert_eq!(stats.count(JobState::Failed), 1);

    let records = coordinator.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get(RecordField::Status), Some(Some("Filed")));
}

#[tokio::test(start_paused = true)]
async fn test_job_ceiling_bounds_the_run() {
    let dir = TempDir::new().unwrap();
    let mut config = config();
    config.crawler.max_jobs = 3;
    let session = two_page_portal(&config);

    let mut coordinator = Coordinator::new(session, config, options(&dir));
    let stats = coordinator.run().await.unwrap();

    // The entry job counts against the ceiling; page 2's first link is refused
    assert_eq!(stats.detail_jobs, 2);
    assert_eq!(stats.records, 2);
    assert_eq!(stats.pages_walked, 2);
    assert!(stats.truncated);
}

#[tokio::test(start_paused = true)]
async fn test_max_pages_limits_pagination() {
    let dir = TempDir::new().unwrap();
    let mut config = config();
    config.crawler.max_pages = Some(1);
    let session = two_page_portal(&config);

    let mut coordinator = Coordinator::new(session, config, options(&dir));
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.pages_walked, 1);
    assert_eq!(stats.records, 2);
    assert!(stats.truncated);
}

#[tokio::test(start_paused = true)]
async fn test_empty_result_table_completes_without_details() {
    let dir = TempDir::new().unwrap();
    let config = config();
    let session = portal_with_results(&config, &results_page(&[], false));

    let mut coordinator = Coordinator::new(session, config, options(&dir));
    let stats = coordinator.run_to_file().await.unwrap();

    assert_eq!(stats.phase, RunPhase::Completed);
    assert_eq!(stats.detail_jobs, 0);
    assert_eq!(stats.pages_walked, 1);
}

#[test]
fn test_start_after_end_is_rejected_before_any_browser_work() {
    let result = CrawlOptions::new("2024-02-01", "2024-01-01", "out.json");
    assert!(matches!(result, Err(ConfigError::DateOrder { .. })));

    let result = CrawlOptions::new("2024-1-01", "2024-01-31", "out.json");
    assert!(matches!(result, Err(ConfigError::InvalidDate(_))));
}
