use crate::model::work_item::{Comment, WorkItem, WorkItemDetails};

/// Render items as one plain-text block, in the order given.
pub fn render(heading: &str, items: &[WorkItem]) -> String {
    let mut out = format!("{heading}\nItems: {}\n", items.len());
    for (index, item) in items.iter().enumerate() {
        out.push('\n');
        out.push_str(&render_entry(index + 1, item));
    }
    out
}

fn render_entry(number: usize, item: &WorkItem) -> String {
    match &item.details {
        WorkItemDetails::Ticket {
            acceptance_criteria,
            comments,
        } => format!(
            "--- jira {number} ---\n\
             Ticket: {id}\n\
             Title: {title}\n\
             Completed On: {date}\n\
             URL: {url}\n\
             \n\
             Description:\n{description}\n\
             \n\
             Acceptance Criteria:\n{acceptance_criteria}\n\
             \n\
             Comments:\n{comments}",
            id = item.id,
            title = item.title,
            date = item.completed_on,
            url = item.url,
            description = item.description,
            comments = render_comments(comments),
        ),
        WorkItemDetails::PullRequest { repository } => format!(
            "--- github {number} ---\n\
             Repo: {repository}\n\
             PR {id}: {title}\n\
             Merged On: {date}\n\
             URL: {url}\n\
             \n\
             Description:\n{description}\n",
            id = item.id,
            title = item.title,
            date = item.completed_on,
            url = item.url,
            description = item.description,
        ),
    }
}

fn render_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "- No comments found.\n".to_string();
    }
    comments
        .iter()
        .map(|c| format!("- {}: {}\n", c.author, c.body))
        .collect()
}
