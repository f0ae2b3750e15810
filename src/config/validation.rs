use crate::config::types::{Config, CrawlerConfig, PortalConfig, TimeoutConfig};
use crate::ConfigError;
use chrono::format::{Item, StrftimeItems};
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_portal_config(&config.portal)?;
    validate_crawler_config(&config.crawler)?;
    validate_timeouts(&config.timeouts)?;
    Ok(())
}

/// Validates the portal layout
fn validate_portal_config(config: &PortalConfig) -> Result<(), ConfigError> {
    if config.search_url.is_empty() {
        return Err(ConfigError::Validation(
            "portal.search-url must not be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.search_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.search_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "search-url '{}' must use http or https",
            config.search_url
        )));
    }

    for (name, selector) in [
        ("date-range-container", &config.date_range_container),
        ("date-from-input", &config.date_from_input),
        ("date-to-input", &config.date_to_input),
        ("checkbox-selector", &config.checkbox_selector),
        ("checkbox-proxy", &config.checkbox_proxy),
        ("submit-button", &config.submit_button),
        ("results-table", &config.results_table),
        ("info-message", &config.info_message),
        ("result-links", &config.result_links),
        ("next-page", &config.next_page),
        ("detail-section", &config.detail_section),
        ("detail-table", &config.detail_table),
        ("highlight-selector", &config.highlight_selector),
    ] {
        validate_selector(name, selector)?;
    }

    validate_class_name("label-cell-class", &config.label_cell_class)?;
    validate_class_name("next-page-disabled-class", &config.next_page_disabled_class)?;

    if config.date_format.is_empty() {
        return Err(ConfigError::Validation(
            "date-format cannot be empty".to_string(),
        ));
    }

    if StrftimeItems::new(&config.date_format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::Validation(format!(
            "date-format '{}' is not a valid chrono format",
            config.date_format
        )));
    }

    if config.checked_boxes.iter().any(|id| id.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "checked-boxes cannot contain empty ids".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl bounds
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_jobs < 1 {
        return Err(ConfigError::Validation(format!(
            "max-jobs must be >= 1, got {}",
            config.max_jobs
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates wait bounds: every wait must be able to succeed
fn validate_timeouts(config: &TimeoutConfig) -> Result<(), ConfigError> {
    for (name, secs) in [
        ("network-idle-secs", config.network_idle_secs),
        ("element-secs", config.element_secs),
        ("navigation-secs", config.navigation_secs),
        ("search-result-secs", config.search_result_secs),
        ("detail-secs", config.detail_secs),
    ] {
        if secs == 0 {
            return Err(ConfigError::Validation(format!("{} must be >= 1", name)));
        }
    }

    Ok(())
}

/// Validates a CSS selector by parsing it
fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "{} cannot be empty",
            name
        )));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, selector, e)))
}

/// Validates a bare class name (no leading dot, no whitespace)
fn validate_class_name(name: &str, class: &str) -> Result<(), ConfigError> {
    if class.is_empty() || class.starts_with('.') || class.contains(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{} must be a bare class name, got '{}'",
            name, class
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.portal.search_url = "https://portal.test/search".to_string();
        config
    }

    #[test]
    fn test_defaults_with_url_are_valid() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_empty_search_url() {
        let mut config = valid_config();
        config.portal.search_url = String::new();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut config = valid_config();
        config.portal.search_url = "ftp://portal.test/search".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_bad_selector() {
        let mut config = valid_config();
        config.portal.results_table = "table[[".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_rejects_dotted_class() {
        let mut config = valid_config();
        config.portal.label_cell_class = ".label".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_broken_date_format() {
        let mut config = valid_config();
        config.portal.date_format = "%d.%m.%Q".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.portal.date_format = "%d.%m.%Y".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_bounds() {
        let mut config = valid_config();
        config.crawler.max_jobs = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.crawler.max_pages = Some(0);
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.timeouts.navigation_secs = 0;
        assert!(validate(&config).is_err());
    }
}
