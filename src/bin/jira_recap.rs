use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use recap::config::{self, FetchConfig, JiraConfig};
use recap::filter::YearWindow;
use recap::providers::jira::JiraProvider;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    recap::logging::init();

    // Load config before any network call
    let vars = config::load_vars()?;
    let jira = JiraConfig::from_vars(&vars)?;
    let fetch = FetchConfig::from_vars(&vars)?;

    let provider = JiraProvider::new(jira, &fetch)?;
    let today = Local::now().date_naive();

    recap::run(&provider, YearWindow::containing(today), Path::new("."), today)
        .await
        .context("Failed to collect completed Jira tickets")?;

    Ok(())
}
