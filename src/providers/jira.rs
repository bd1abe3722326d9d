use async_trait::async_trait;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

use super::{collect_qualifying, Provider};
use crate::config::{FetchConfig, JiraConfig};
use crate::error::Result;
use crate::filter::{parse_completion_date, Candidate, RecordFilter, YearWindow};
use crate::http;
use crate::model::work_item::{
    or_placeholder, Comment, WorkItem, WorkItemDetails, EMPTY_COMMENT, NO_ACCEPTANCE_CRITERIA,
    NO_DESCRIPTION, NO_TITLE, UNKNOWN_AUTHOR,
};
use crate::paginate::{Cursor, Page, PageSource, Paginator};
use crate::util::adf::extract_text_from_adf;

const DONE_STATUSES: &[&str] = &["done", "closed", "resolved"];

pub struct JiraProvider {
    config: JiraConfig,
    auth_header: String,
    client: reqwest::Client,
    page_size: usize,
    max_pages: usize,
}

impl JiraProvider {
    pub fn new(config: JiraConfig, fetch: &FetchConfig) -> Result<Self> {
        let creds = format!("{}:{}", config.email, config.api_token);
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        Ok(Self {
            config,
            auth_header: format!("Basic {encoded}"),
            client: http::build_client(fetch.timeout)?,
            page_size: fetch.page_size,
            max_pages: fetch.max_pages,
        })
    }

    pub fn jql(&self, window: YearWindow) -> String {
        format!(
            "assignee = '{}' AND status in (Done, Closed, Resolved) \
             AND resolutiondate >= \"{}\" AND resolutiondate < \"{}-01-01\" \
             ORDER BY created DESC",
            self.config.assignee_account_id,
            window.first_day(),
            window.year() + 1,
        )
    }

    fn fields(&self) -> Vec<String> {
        [
            "summary",
            "description",
            "comment",
            "status",
            "assignee",
            "resolutiondate",
            self.config.ac_field_id.as_str(),
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn extract(&self, issue: JiraIssue) -> Option<WorkItem> {
        let completed_on = issue.completed_on()?;
        let url = format!("{}/browse/{}", self.config.url, issue.key);
        let fields = issue.fields;

        let description = fields.description.as_ref().and_then(extract_text_from_adf);
        let acceptance_criteria = fields
            .extra
            .get(&self.config.ac_field_id)
            .and_then(field_text);
        let comments = fields
            .comment
            .map(|page| page.comments)
            .unwrap_or_default()
            .into_iter()
            .map(|c| Comment {
                author: or_placeholder(c.author.and_then(|a| a.display_name), UNKNOWN_AUTHOR),
                body: or_placeholder(c.body.as_ref().and_then(extract_text_from_adf), EMPTY_COMMENT),
            })
            .collect();

        Some(WorkItem {
            id: issue.key,
            title: or_placeholder(fields.summary, NO_TITLE),
            description: or_placeholder(description, NO_DESCRIPTION),
            completed_on,
            url,
            details: WorkItemDetails::Ticket {
                acceptance_criteria: or_placeholder(acceptance_criteria, NO_ACCEPTANCE_CRITERIA),
                comments,
            },
        })
    }
}

/// Render a custom field value as text: plain strings, numbers, select
/// options (`{"value": ...}`), ADF documents, or lists of those.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(_) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(values) => {
            let parts: Vec<String> = values.iter().filter_map(field_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(obj) => match obj.get("value").and_then(|v| v.as_str()) {
            Some(option) => Some(option.to_string()),
            None => extract_text_from_adf(value),
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    jql: &'a str,
    fields: &'a [String],
    max_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_page_token: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
    next_page_token: Option<String>,
    #[serde(default)]
    is_last: bool,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Debug, Deserialize, Default)]
struct IssueFields {
    summary: Option<String>,
    description: Option<Value>,
    status: Option<StatusField>,
    assignee: Option<UserField>,
    resolutiondate: Option<String>,
    comment: Option<CommentPage>,
    /// Custom fields, looked up by the configured id.
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusField {
    #[serde(default)]
    name: String,
    status_category: Option<StatusCategory>,
}

#[derive(Debug, Deserialize)]
struct StatusCategory {
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserField {
    account_id: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentPage {
    #[serde(default)]
    comments: Vec<JiraComment>,
}

#[derive(Debug, Deserialize)]
struct JiraComment {
    author: Option<UserField>,
    body: Option<Value>,
}

impl Candidate for JiraIssue {
    fn completed_on(&self) -> Option<NaiveDate> {
        self.fields
            .resolutiondate
            .as_deref()
            .and_then(parse_completion_date)
    }

    fn owner(&self) -> Option<&str> {
        self.fields.assignee.as_ref()?.account_id.as_deref()
    }

    fn is_completed(&self) -> bool {
        self.fields.status.as_ref().is_some_and(|status| {
            DONE_STATUSES.contains(&status.name.to_lowercase().as_str())
                || status
                    .status_category
                    .as_ref()
                    .is_some_and(|c| c.key.eq_ignore_ascii_case("done"))
        })
    }
}

/// Token-paginated `POST /rest/api/3/search/jql`.
struct JiraSearch<'a> {
    provider: &'a JiraProvider,
    jql: String,
    fields: Vec<String>,
}

#[async_trait]
impl<'a> PageSource for JiraSearch<'a> {
    type Record = JiraIssue;

    fn page_size(&self) -> usize {
        self.provider.page_size
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<JiraIssue>> {
        let body = SearchRequest {
            jql: &self.jql,
            fields: &self.fields,
            max_results: self.provider.page_size,
            next_page_token: match cursor {
                Cursor::Token(token) => Some(token.as_str()),
                _ => None,
            },
        };

        let resp = self
            .provider
            .client
            .post(format!("{}/rest/api/3/search/jql", self.provider.config.url))
            .header("Authorization", &self.provider.auth_header)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let search: SearchResponse = http::read_json(self.provider.name(), resp).await?;
        let next = match search.next_page_token {
            Some(token) if !search.is_last && !token.is_empty() => Some(Cursor::Token(token)),
            _ => None,
        };
        Ok(Page {
            records: search.issues,
            next,
        })
    }
}

#[async_trait]
impl Provider for JiraProvider {
    fn name(&self) -> &str {
        "Jira"
    }

    fn output_prefix(&self) -> &str {
        "jira_tickets"
    }

    fn heading(&self, window: YearWindow) -> String {
        format!("Completed Jira tickets for {}", window.year())
    }

    async fn fetch_completed(&self, window: YearWindow) -> Result<Vec<WorkItem>> {
        let jql = self.jql(window);
        info!(
            email = %self.config.email,
            jql = %jql,
            "Fetching completed Jira tickets"
        );

        let search = JiraSearch {
            provider: self,
            jql,
            fields: self.fields(),
        };
        let filter = RecordFilter::new(window, &self.config.assignee_account_id);
        collect_qualifying(
            self.name(),
            Paginator::new(search, self.max_pages),
            &filter,
            |issue| self.extract(issue),
        )
        .await
    }
}
