//! JSON record writer

use crate::record::TrademarkRecord;
use crate::HarvestError;
use std::fs;
use std::path::Path;

/// Writes the record collection as a pretty-printed JSON array
///
/// Missing parent directories are created. An existing file is replaced.
///
/// # Arguments
///
/// * `path` - Destination file
/// * `records` - The collected records, in collection order
pub fn write_records(path: &Path, records: &[TrademarkRecord]) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut json = serde_json::to_string_pretty(records)?;
    json.push('\n');
    fs::write(path, json)?;

    tracing::info!("Wrote {} record(s) to {}", records.len(), path.display());
    Ok(())
}
