pub mod github;
pub mod jira;

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::filter::{Candidate, RecordFilter, YearWindow};
use crate::model::work_item::WorkItem;
use crate::paginate::{PageSource, Paginator};

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;
    /// File name prefix of the report, e.g. `jira_tickets`.
    fn output_prefix(&self) -> &str;
    fn heading(&self, window: YearWindow) -> String;
    /// Every completed item in `window`, in the order the provider returned them.
    async fn fetch_completed(&self, window: YearWindow) -> Result<Vec<WorkItem>>;
}

/// Drain the paginator, filtering each page as it arrives and extracting
/// the records that qualify.
pub(crate) async fn collect_qualifying<S, F>(
    provider: &str,
    mut paginator: Paginator<S>,
    filter: &RecordFilter,
    mut extract: F,
) -> Result<Vec<WorkItem>>
where
    S: PageSource,
    S::Record: Candidate,
    F: FnMut(S::Record) -> Option<WorkItem> + Send,
{
    let mut items = Vec::new();
    let mut fetched = 0usize;

    while let Some(records) = paginator.next_page().await? {
        fetched += records.len();
        items.extend(
            records
                .into_iter()
                .filter(|record| filter.accepts(record))
                .filter_map(&mut extract),
        );
        info!(provider, fetched, kept = items.len(), "Fetched page");
    }

    info!(
        provider,
        pages = paginator.requests(),
        fetched,
        kept = items.len(),
        truncated = paginator.truncated(),
        "All pages fetched"
    );
    Ok(items)
}
