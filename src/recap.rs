use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::filter::YearWindow;
use crate::format;
use crate::output;
use crate::providers::Provider;

/// Fetch, format and write one provider's report.
///
/// Returns the written path, or `None` when nothing qualified and no file
/// was written. Any error leaves the output directory untouched.
pub async fn run(
    provider: &dyn Provider,
    window: YearWindow,
    out_dir: &Path,
    today: NaiveDate,
) -> Result<Option<PathBuf>> {
    let items = provider.fetch_completed(window).await?;
    if items.is_empty() {
        info!(
            provider = provider.name(),
            year = window.year(),
            "No completed items found; nothing written"
        );
        return Ok(None);
    }

    info!(provider = provider.name(), count = items.len(), "Formatting report");
    let report = format::render(&provider.heading(window), &items);
    let path = output::write_report(out_dir, provider.output_prefix(), today, &report)?;
    info!(path = %path.display(), "Wrote report");
    Ok(Some(path))
}
