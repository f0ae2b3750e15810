//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the job loop that coordinates a run:
//! - Dispatching the entry job (search + pagination) and detail jobs
//! - Tracking the run phase and the form-filled flag
//! - Collecting extracted records
//! - Flushing the record collection, including after an abort

use crate::browser::{bounded, wait_for_selector, BrowserSession, ChromiumSession};
use crate::config::{Config, CrawlOptions};
use crate::crawler::extractor::extract_record;
use crate::crawler::pagination::walk_results;
use crate::crawler::queue::{CrawlJob, JobQueue};
use crate::crawler::search::execute_search;
use crate::crawler::step_error;
use crate::output::{write_records, CrawlStatistics};
use crate::record::TrademarkRecord;
use crate::state::{JobState, RunPhase, RunState};
use crate::HarvestError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Main crawler coordinator structure
pub struct Coordinator {
    session: Arc<dyn BrowserSession>,
    config: Arc<Config>,
    options: CrawlOptions,
    state: RunState,
    queue: JobQueue,
    records: Arc<Mutex<Vec<TrademarkRecord>>>,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a coordinator for one run, with the entry job queued
    ///
    /// # Arguments
    ///
    /// * `session` - The browser tab every job runs in
    /// * `config` - Validated portal, crawler and timeout settings
    /// * `options` - The search window and output path
    pub fn new(session: Arc<dyn BrowserSession>, config: Config, options: CrawlOptions) -> Self {
        let mut queue = JobQueue::new(config.crawler.max_jobs);
        queue.push(CrawlJob::Entry);

        Self {
            session,
            config: Arc::new(config),
            options,
            state: RunState::new(),
            queue,
            records: Arc::new(Mutex::new(Vec::new())),
            stats: CrawlStatistics::new(),
        }
    }

    /// Runs the job loop until the queue is exhausted
    ///
    /// This is the core logic that:
    /// 1. Runs the entry job: search, then pagination
    /// 2. Runs each discovered detail job and collects its record
    ///
    /// Any entry job failure aborts the run. Detail job failures are logged and
    /// counted, never propagated.
    pub async fn run(&mut self) -> Result<CrawlStatistics, HarvestError> {
        tracing::info!(
            "Starting harvest for {} .. {}",
            self.options.start_date,
            self.options.end_date
        );

        let start_time = Instant::now();

        while let Some(job) = self.queue.pop() {
            tracing::debug!("Processing {}", job);

            match job {
                CrawlJob::Entry => {
                    if let Err(e) = self.handle_entry().await {
                        if e.is_fatal() {
                            tracing::error!("Harvest cannot continue: {}", e);
                        } else {
                            tracing::error!("Entry job failed: {}", e);
                        }
                        self.abort(&e);
                        self.finish(start_time);
                        return Err(e);
                    }
                }
                CrawlJob::Detail { url } => {
                    let outcome = self.handle_detail(&url).await;
                    self.stats.record_detail(outcome);

                    // Progress reporting every 10 detail pages
                    if self.stats.detail_jobs % 10 == 0 {
                        let elapsed = start_time.elapsed();
                        let rate = self.stats.detail_jobs as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
                        tracing::info!(
                            "Progress: {} detail pages processed, {} queued, {:.2} pages/sec",
                            self.stats.detail_jobs,
                            self.queue.len(),
                            rate
                        );
                    }
                }
            }
        }

        self.state.transition(RunPhase::Completed)?;
        self.finish(start_time);

        tracing::info!(
            "Harvest completed: {} record(s) from {} detail page(s) in {:?}",
            self.stats.records,
            self.stats.detail_jobs,
            self.stats.duration
        );

        Ok(self.stats.clone())
    }

    /// Runs the job loop and writes whatever was collected to the output path
    ///
    /// The collection is written even when the run aborts. A run error takes
    /// precedence over a write error.
    pub async fn run_to_file(&mut self) -> Result<CrawlStatistics, HarvestError> {
        let result = self.run().await;
        let records = self.records();

        match (result, write_records(&self.options.output, &records)) {
            (Ok(stats), Ok(())) => Ok(stats),
            (Ok(_), Err(write_error)) => Err(write_error),
            (Err(run_error), Ok(())) => Err(run_error),
            (Err(run_error), Err(write_error)) => {
                tracing::error!("Failed to write records: {}", write_error);
                Err(run_error)
            }
        }
    }

    /// Snapshot of the records collected so far
    pub fn records(&self) -> Vec<TrademarkRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Fills and submits the search form, then walks every result page
    async fn handle_entry(&mut self) -> Result<(), HarvestError> {
        self.state.transition(RunPhase::Searching)?;

        let search_url = self.config.portal.search_url.clone();
        let timeouts = &self.config.timeouts;
        tracing::info!("Opening search page {}", search_url);
        bounded("search page", timeouts.navigation(), self.session.goto(&search_url))
            .await
            .map_err(step_error("search page"))?;

        if !self.state.form_filled() {
            let report = execute_search(&*self.session, &self.config, &self.options).await?;
            self.stats.checkboxes_skipped = report.skipped.len();
            self.state.mark_form_filled();
        }

        self.state.transition(RunPhase::Paginating)?;
        let report = walk_results(&*self.session, &self.config, &mut self.queue).await?;
        self.stats.pages_walked = report.pages;
        self.stats.truncated = report.truncated;

        tracing::info!(
            "Pagination finished: {} result page(s), {} detail job(s) queued",
            report.pages,
            report.links
        );

        if !self.queue.is_empty() {
            self.state.transition(RunPhase::Extracting)?;
        }

        Ok(())
    }

    /// Extracts one detail page, converting every failure into a job state
    async fn handle_detail(&mut self, url: &str) -> JobState {
        let outcome = match self.extract_detail(url).await {
            Ok(record) if record.is_empty() => {
                tracing::warn!(
                    "{}",
                    HarvestError::ExtractionEmpty {
                        url: url.to_string()
                    }
                );
                JobState::Empty
            }
            Ok(record) => {
                tracing::debug!("Extracted {} field(s) from {}", record.populated_count(), url);
                self.records
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(record);
                self.stats.records += 1;
                JobState::Extracted
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("Detail page {} timed out: {}", url, e);
                JobState::TimedOut
            }
            Err(e) => {
                tracing::warn!("Detail page {} failed: {}", url, e);
                JobState::Failed
            }
        };

        debug_assert!(JobState::Running.can_transition_to(outcome));
        tracing::debug!("Detail job {} -> {}", url, outcome);
        outcome
    }

    async fn extract_detail(&self, url: &str) -> Result<TrademarkRecord, HarvestError> {
        let timeouts = &self.config.timeouts;

        bounded("detail page", timeouts.navigation(), self.session.goto(url))
            .await
            .map_err(step_error("detail navigation"))?;

        if let Err(e) = self.session.wait_for_network_idle(timeouts.network_idle()).await {
            tracing::debug!("Detail page {} did not go idle: {}", url, e);
        }

        wait_for_selector(&*self.session, &self.config.portal.detail_section, timeouts.detail())
            .await
            .map_err(step_error("detail section"))?;

        let html = self.session.content().await?;
        extract_record(&html, &self.config.portal)
    }

    fn abort(&mut self, error: &HarvestError) {
        if let Err(e) = self.state.transition(RunPhase::Aborted) {
            tracing::debug!("{}", e);
        }
        self.stats.abort_reason = Some(error.to_string());
    }

    fn finish(&mut self, start_time: Instant) {
        self.stats.phase = self.state.phase();
        self.stats.duration = start_time.elapsed();
    }
}

/// Runs a complete harvest against a real browser
///
/// This is the main entry point for a run. It will:
/// 1. Launch (or connect to) Chromium
/// 2. Run the entry job and every detail job
/// 3. Write the collected records to the output path, even after an abort
/// 4. Close the browser
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `options` - The search window and output path
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - The run completed
/// * `Err(HarvestError)` - The run aborted or could not start
pub async fn run_harvest(
    config: Config,
    options: CrawlOptions,
) -> Result<CrawlStatistics, HarvestError> {
    let session = Arc::new(ChromiumSession::launch(&config.browser).await?);

    let result = {
        let mut coordinator = Coordinator::new(session.clone(), config, options);
        coordinator.run_to_file().await
    };

    match Arc::try_unwrap(session) {
        Ok(session) => {
            if let Err(e) = session.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
        }
        Err(_) => tracing::debug!("Browser session still shared, leaving it open"),
    }

    result
}
