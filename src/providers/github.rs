use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use super::{collect_qualifying, Provider};
use crate::config::{FetchConfig, GitHubConfig};
use crate::error::{RecapError, Result};
use crate::filter::{parse_completion_date, Candidate, RecordFilter, YearWindow};
use crate::http;
use crate::model::work_item::{
    or_placeholder, WorkItem, WorkItemDetails, NO_DESCRIPTION, NO_TITLE, UNKNOWN_REPOSITORY,
};
use crate::paginate::{Cursor, Page, PageSource, Paginator};

/// The search API never returns more than this many results for one query.
const SEARCH_RESULT_CAP: u64 = 1000;

pub struct GitHubProvider {
    config: GitHubConfig,
    client: reqwest::Client,
    page_size: usize,
    max_pages: usize,
}

impl GitHubProvider {
    pub fn new(config: GitHubConfig, fetch: &FetchConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: http::build_client(fetch.timeout)?,
            page_size: fetch.page_size,
            max_pages: fetch.max_pages,
        })
    }

    pub fn search_query(&self, window: YearWindow) -> String {
        format!(
            "is:pr author:{} is:merged merged:{}..{}",
            self.config.username,
            window.first_day(),
            window.last_day()
        )
    }

    fn extract(&self, pr: GhPullRequest) -> Option<WorkItem> {
        let completed_on = pr.completed_on()?;
        let repository = repo_name(&pr.repository_url).map(String::from);

        Some(WorkItem {
            id: format!("#{}", pr.number),
            title: or_placeholder(pr.title, NO_TITLE),
            description: or_placeholder(pr.body, NO_DESCRIPTION),
            completed_on,
            url: pr.html_url,
            details: WorkItemDetails::PullRequest {
                repository: or_placeholder(repository, UNKNOWN_REPOSITORY),
            },
        })
    }
}

/// `owner/name` from an API repository URL such as
/// `https://api.github.com/repos/acme/widgets`.
fn repo_name(repository_url: &str) -> Option<&str> {
    let trimmed = repository_url.trim_end_matches('/');
    if let Some((_, rest)) = trimmed.split_once("/repos/") {
        return Some(rest).filter(|r| !r.is_empty());
    }
    let name_start = trimmed.rfind('/')?;
    let owner_start = trimmed[..name_start].rfind('/')?;
    Some(&trimmed[owner_start + 1..])
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    items: Vec<GhPullRequest>,
}

#[derive(Debug, Deserialize)]
struct GhPullRequest {
    number: u64,
    title: Option<String>,
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    repository_url: String,
    user: Option<GhUser>,
    pull_request: Option<PullRequestRef>,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    merged_at: Option<String>,
}

impl GhPullRequest {
    fn merged_at(&self) -> Option<&str> {
        self.pull_request.as_ref()?.merged_at.as_deref()
    }
}

impl Candidate for GhPullRequest {
    fn completed_on(&self) -> Option<NaiveDate> {
        self.merged_at().and_then(parse_completion_date)
    }

    fn owner(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.login.as_str())
    }

    fn is_completed(&self) -> bool {
        self.merged_at().is_some()
    }

    fn scope(&self) -> Option<&str> {
        repo_name(&self.repository_url)
    }
}

/// Page-numbered `GET /search/issues`.
struct PullRequestSearch<'a> {
    provider: &'a GitHubProvider,
    query: String,
}

#[async_trait]
impl<'a> PageSource for PullRequestSearch<'a> {
    type Record = GhPullRequest;

    fn page_size(&self) -> usize {
        self.provider.page_size
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<GhPullRequest>> {
        let page = match cursor {
            Cursor::Start => 1,
            Cursor::Page(n) => *n,
            Cursor::Token(_) => {
                return Err(RecapError::data_shape(
                    self.provider.name(),
                    "search results are page-numbered, got a continuation token",
                ))
            }
        };
        let per_page = self.provider.page_size;

        let resp = self
            .provider
            .client
            .get(format!("{}/search/issues", self.provider.config.api_url))
            .bearer_auth(&self.provider.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .query(&[
                ("q", self.query.as_str()),
                ("per_page", &per_page.to_string()),
                ("page", &page.to_string()),
            ])
            .send()
            .await?;

        let search: SearchResponse = http::read_json(self.provider.name(), resp).await?;

        let seen = u64::from(page) * per_page as u64;
        debug!(
            page,
            seen = seen.min(search.total_count),
            total = search.total_count,
            "Fetched pull request page"
        );
        let exhausted = search.items.is_empty()
            || seen >= search.total_count
            || seen >= SEARCH_RESULT_CAP;
        Ok(Page {
            records: search.items,
            next: (!exhausted).then(|| Cursor::Page(page + 1)),
        })
    }
}

#[async_trait]
impl Provider for GitHubProvider {
    fn name(&self) -> &str {
        "GitHub"
    }

    fn output_prefix(&self) -> &str {
        "github_contributions"
    }

    fn heading(&self, window: YearWindow) -> String {
        format!(
            "Merged GitHub pull requests by {} for {}",
            self.config.username,
            window.year()
        )
    }

    async fn fetch_completed(&self, window: YearWindow) -> Result<Vec<WorkItem>> {
        let query = self.search_query(window);
        info!(query = %query, "Fetching merged GitHub pull requests");

        let search = PullRequestSearch {
            provider: self,
            query,
        };
        let filter = RecordFilter::new(window, &self.config.username)
            .with_scope(self.config.repo_filter.clone());
        collect_qualifying(
            self.name(),
            Paginator::new(search, self.max_pages),
            &filter,
            |pr| self.extract(pr),
        )
        .await
    }
}
