use crate::ConfigError;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Default output file when none is given
pub const DEFAULT_OUTPUT: &str = "output.json";

/// Immutable run configuration: the search window and where records go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub output: PathBuf,
}

impl CrawlOptions {
    /// Builds run options from raw `YYYY-MM-DD` strings
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOptions)` - Both dates are well formed and start <= end
    /// * `Err(ConfigError::InvalidDate)` - A date is malformed
    /// * `Err(ConfigError::DateOrder)` - The start date is after the end date
    pub fn new(start: &str, end: &str, output: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let start_date = parse_date(start)?;
        let end_date = parse_date(end)?;

        if start_date > end_date {
            return Err(ConfigError::DateOrder {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            start_date,
            end_date,
            output: output.into(),
        })
    }
}

/// Parses a strict `YYYY-MM-DD` date
///
/// chrono alone accepts unpadded fields such as `2024-1-5`, so the shape is
/// checked before the calendar value.
pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !shaped {
        return Err(ConfigError::InvalidDate(value.to_string()));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}
