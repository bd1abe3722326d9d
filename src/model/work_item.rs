use chrono::NaiveDate;

pub const NO_DESCRIPTION: &str = "No description provided.";
pub const NO_ACCEPTANCE_CRITERIA: &str = "No acceptance criteria provided.";
pub const NO_TITLE: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const EMPTY_COMMENT: &str = "(no text)";
pub const UNKNOWN_REPOSITORY: &str = "unknown repository";

/// A completed ticket or merged pull request, normalized for formatting.
///
/// Optional source fields are already replaced by placeholders, so every
/// string here is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// `PROJ-123` for tickets, `#42` for pull requests.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Resolution date for tickets, merge date for pull requests.
    pub completed_on: NaiveDate,
    pub url: String,
    pub details: WorkItemDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItemDetails {
    Ticket {
        acceptance_criteria: String,
        comments: Vec<Comment>,
    },
    PullRequest {
        /// `owner/name`
        repository: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub body: String,
}

/// Substitute `placeholder` for a missing or blank value.
pub fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}
