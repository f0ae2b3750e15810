use serde::Deserialize;
use std::time::Duration;

/// Advanced search page used when neither the config file nor the command line
/// names one
pub const DEFAULT_SEARCH_URL: &str = "https://register.example.gov/trademarks/advanced-search";

/// Main configuration structure for tm-harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub portal: PortalConfig,
    pub browser: BrowserConfig,
    pub crawler: CrawlerConfig,
    pub timeouts: TimeoutConfig,
}

/// Portal layout: where the search form lives and how its pieces are found
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PortalConfig {
    /// Advanced search page (the entry job target)
    pub search_url: String,

    /// Container that holds both date-range inputs
    pub date_range_container: String,

    /// "Date from" input
    pub date_from_input: String,

    /// "Date to" input
    pub date_to_input: String,

    /// chrono format used when typing dates into the form
    pub date_format: String,

    /// Every checkbox on the search form
    pub checkbox_selector: String,

    /// Clickable "box" element enclosing a checkbox
    pub checkbox_proxy: String,

    /// Ids of the checkboxes that must end up checked; all others are unchecked
    pub checked_boxes: Vec<String>,

    pub submit_button: String,

    pub results_table: String,

    /// Informational message shown instead of (or above) the results table
    pub info_message: String,

    /// Row-level anchors inside the results table
    pub result_links: String,

    pub next_page: String,

    /// Class the paginator puts on a "next" control that cannot be used
    pub next_page_disabled_class: String,

    /// Element whose presence marks a rendered detail page
    pub detail_section: String,

    /// Table holding label/value cell pairs on a detail page
    pub detail_table: String,

    /// Class marking a label-style cell
    pub label_cell_class: String,

    /// Emphasised value inside a value cell
    pub highlight_selector: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            date_range_container: "#dateRange".to_string(),
            date_from_input: "#dateFrom_input".to_string(),
            date_to_input: "#dateTo_input".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            checkbox_selector: "#searchForm input[type='checkbox']".to_string(),
            checkbox_proxy: ".ui-chkbox-box".to_string(),
            checked_boxes: vec![
                "ipType_trademark".to_string(),
                "status_registered".to_string(),
                "status_filed".to_string(),
            ],
            submit_button: "#searchButton".to_string(),
            results_table: "#resultsTable".to_string(),
            info_message: ".ui-messages-info-summary".to_string(),
            result_links: "#resultsTable tbody tr td a".to_string(),
            next_page: ".ui-paginator-next".to_string(),
            next_page_disabled_class: "ui-state-disabled".to_string(),
            detail_section: "#detailPanel".to_string(),
            detail_table: "#detailPanel table".to_string(),
            label_cell_class: "label".to_string(),
            highlight_selector: "span.highlight".to_string(),
        }
    }
}

/// Browser launch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,

    /// Chromium binary to launch instead of the auto-detected one
    pub executable: Option<String>,

    /// Connect to an already running Chromium instead of launching one
    pub remote_debugging_url: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            remote_debugging_url: None,
        }
    }
}

/// Crawl bounds and settle pauses
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of jobs (entry + detail) a run may enqueue
    pub max_jobs: usize,

    /// Optional ceiling on the number of result pages walked
    pub max_pages: Option<usize>,

    /// Pause after toggling a checkbox (milliseconds)
    pub checkbox_settle_ms: u64,

    /// Pause between keystrokes when typing a date (milliseconds)
    pub key_delay_ms: u64,

    /// Pause after a date input has been filled (milliseconds)
    pub input_settle_ms: u64,

    /// Pause after clicking the "next page" control (milliseconds)
    pub page_settle_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_jobs: 1000,
            max_pages: None,
            checkbox_settle_ms: 100,
            key_delay_ms: 50,
            input_settle_ms: 300,
            page_settle_ms: 1500,
        }
    }
}

impl CrawlerConfig {
    pub fn checkbox_settle(&self) -> Duration {
        Duration::from_millis(self.checkbox_settle_ms)
    }

    pub fn key_delay(&self) -> Duration {
        Duration::from_millis(self.key_delay_ms)
    }

    pub fn input_settle(&self) -> Duration {
        Duration::from_millis(self.input_settle_ms)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }
}

/// Upper bounds for every external wait (seconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TimeoutConfig {
    pub network_idle_secs: u64,
    pub element_secs: u64,
    pub navigation_secs: u64,
    pub search_result_secs: u64,
    pub detail_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            network_idle_secs: 30,
            element_secs: 30,
            navigation_secs: 15,
            search_result_secs: 60,
            detail_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn network_idle(&self) -> Duration {
        Duration::from_secs(self.network_idle_secs)
    }

    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_secs(self.navigation_secs)
    }

    pub fn search_result(&self) -> Duration {
        Duration::from_secs(self.search_result_secs)
    }

    pub fn detail(&self) -> Duration {
        Duration::from_secs(self.detail_secs)
    }
}
