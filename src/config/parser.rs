use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Missing sections and keys fall back to their defaults.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tm_harvest::config::load_config;
///
/// let config = load_config(Path::new("portal.toml")).unwrap();
/// println!("Search page: {}", config.portal.search_url);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

/// Resolves the effective configuration for a run
///
/// Starts from the file at `path` (or the defaults when absent), applies the
/// command-line overrides, then validates the result.
pub fn resolve_config(
    path: Option<&Path>,
    search_url: Option<&str>,
    headful: bool,
) -> ConfigResult<Config> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    if let Some(url) = search_url {
        config.portal.search_url = url.to_string();
    }

    if headful {
        config.browser.headless = false;
    }

    if config.browser.remote_debugging_url.is_none() {
        config.browser.remote_debugging_url = std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL").ok();
    }

    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::DEFAULT_SEARCH_URL;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config(
            r#"
[portal]
search-url = "https://portal.test/search"
checked-boxes = ["a", "b"]

[crawler]
max-pages = 5
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.portal.search_url, "https://portal.test/search");
        assert_eq!(config.portal.checked_boxes, vec!["a", "b"]);
        assert_eq!(config.portal.results_table, "#resultsTable");
        assert_eq!(config.crawler.max_pages, Some(5));
        assert_eq!(config.crawler.max_jobs, 1000);
        assert_eq!(config.timeouts.navigation_secs, 15);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/portal.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let config = resolve_config(None, None, false).unwrap();
        assert_eq!(config.portal.search_url, DEFAULT_SEARCH_URL);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let file = create_temp_config(
            r#"
[portal]
search-url = "https://portal.test/search"
"#,
        );

        let config = resolve_config(
            Some(file.path()),
            Some("https://other.test/advanced"),
            true,
        )
        .unwrap();

        assert_eq!(config.portal.search_url, "https://other.test/advanced");
        assert!(!config.browser.headless);
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = parse_config(include_str!("../../portal.example.toml")).unwrap();
        validate(&config).unwrap();

        assert_eq!(config.crawler.max_jobs, 1000);
        assert_eq!(config.crawler.max_pages, None);
        assert_eq!(config.portal.checked_boxes.len(), 3);
    }
}
