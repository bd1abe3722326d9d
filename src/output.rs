use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// `<prefix>_YYYY-MM-DD.txt`, e.g. `jira_tickets_2024-03-15.txt`.
pub fn output_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_{}.txt", date.format("%Y-%m-%d"))
}

/// Write the report into `dir`, replacing any file of the same name.
pub fn write_report(dir: &Path, prefix: &str, date: NaiveDate, contents: &str) -> Result<PathBuf> {
    let path = dir.join(output_filename(prefix, date));
    std::fs::write(&path, contents)?;
    Ok(path)
}
