use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RecapError, Result};

/// Resolved configuration values keyed by environment variable name.
pub type Vars = HashMap<String, String>;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Both search APIs cap a page at 100 records.
pub const MAX_PAGE_SIZE: usize = 100;

const KNOWN_KEYS: &[&str] = &[
    "JIRA_URL",
    "JIRA_EMAIL",
    "JIRA_API_TOKEN",
    "JIRA_AC_FIELD_ID",
    "JIRA_ASSIGNEE_ACCOUNT_ID",
    "GITHUB_TOKEN",
    "GITHUB_USERNAME",
    "GITHUB_REPO_FILTER",
    "GITHUB_API_URL",
    "RECAP_PAGE_SIZE",
    "RECAP_MAX_PAGES",
    "RECAP_HTTP_TIMEOUT_SECS",
];

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub jira: Option<JiraSection>,
    pub github: Option<GitHubSection>,
    pub fetch: Option<FetchSection>,
}

#[derive(Debug, Deserialize, Default)]
pub struct JiraSection {
    pub url: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub ac_field_id: Option<String>,
    pub assignee_account_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GitHubSection {
    pub token: Option<String>,
    pub username: Option<String>,
    pub repo_filter: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FetchSection {
    pub page_size: Option<usize>,
    pub max_pages: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    fn into_vars(self) -> Vars {
        let mut vars = Vars::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                vars.insert(key.to_string(), value);
            }
        };

        if let Some(jira) = self.jira {
            put("JIRA_URL", jira.url);
            put("JIRA_EMAIL", jira.email);
            put("JIRA_API_TOKEN", jira.api_token);
            put("JIRA_AC_FIELD_ID", jira.ac_field_id);
            put("JIRA_ASSIGNEE_ACCOUNT_ID", jira.assignee_account_id);
        }
        if let Some(github) = self.github {
            put("GITHUB_TOKEN", github.token);
            put("GITHUB_USERNAME", github.username);
            put("GITHUB_REPO_FILTER", github.repo_filter);
            put("GITHUB_API_URL", github.api_url);
        }
        if let Some(fetch) = self.fetch {
            put("RECAP_PAGE_SIZE", fetch.page_size.map(|v| v.to_string()));
            put("RECAP_MAX_PAGES", fetch.max_pages.map(|v| v.to_string()));
            put("RECAP_HTTP_TIMEOUT_SECS", fetch.timeout_secs.map(|v| v.to_string()));
        }
        vars
    }
}

pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".work-recap")
        .join("config.toml")
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| {
        RecapError::config(format!("Failed to read config from {}: {e}", path.display()))
    })?;
    toml::from_str(&contents).map_err(|e| {
        RecapError::config(format!("Failed to parse {}: {e}", path.display()))
    })
}

/// Resolve configuration: config file, then `.env`, then the process environment.
pub fn load_vars() -> Result<Vars> {
    let mut vars = load_file_config(&config_path())?.into_vars();

    // dotenvy never overrides variables already set in the environment.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(RecapError::config(format!("Failed to load .env: {e}")));
        }
    }

    merge_env(&mut vars, std::env::vars());
    Ok(vars)
}

/// Overlay known environment variables. Blank values leave lower layers intact.
fn merge_env(vars: &mut Vars, env: impl IntoIterator<Item = (String, String)>) {
    vars.extend(env.into_iter().filter(|(key, value)| {
        KNOWN_KEYS.contains(&key.as_str()) && !value.trim().is_empty()
    }));
}

fn lookup<'a>(vars: &'a Vars, key: &str) -> Option<&'a str> {
    vars.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Fetch every key or report all the missing ones at once.
fn require<const N: usize>(vars: &Vars, keys: [&str; N]) -> Result<[String; N]> {
    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|key| lookup(vars, key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(RecapError::config(format!(
            "Missing environment variables: {}",
            missing.join(", ")
        )));
    }
    Ok(keys.map(|key| lookup(vars, key).unwrap_or_default().to_string()))
}

fn parse_number<T: std::str::FromStr>(vars: &Vars, key: &str) -> Result<Option<T>> {
    match lookup(vars, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| RecapError::config(format!("{key} must be a positive integer, got {raw:?}"))),
    }
}

#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub url: String,
    pub email: String,
    pub api_token: String,
    pub ac_field_id: String,
    pub assignee_account_id: String,
}

impl JiraConfig {
    pub fn from_vars(vars: &Vars) -> Result<Self> {
        let [url, email, api_token, ac_field_id, assignee_account_id] = require(
            vars,
            [
                "JIRA_URL",
                "JIRA_EMAIL",
                "JIRA_API_TOKEN",
                "JIRA_AC_FIELD_ID",
                "JIRA_ASSIGNEE_ACCOUNT_ID",
            ],
        )?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            email,
            api_token,
            ac_field_id,
            assignee_account_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub username: String,
    /// Only repositories whose `owner/name` contains this (case-insensitive).
    pub repo_filter: Option<String>,
    pub api_url: String,
}

impl GitHubConfig {
    pub fn from_vars(vars: &Vars) -> Result<Self> {
        let [token, username] = require(vars, ["GITHUB_TOKEN", "GITHUB_USERNAME"])?;
        let api_url = lookup(vars, "GITHUB_API_URL")
            .unwrap_or(DEFAULT_GITHUB_API_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            token,
            username,
            repo_filter: lookup(vars, "GITHUB_REPO_FILTER").map(String::from),
            api_url,
        })
    }
}

/// Knobs shared by both fetch pipelines.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub page_size: usize,
    pub max_pages: usize,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_pages: 100,
            timeout: Duration::from_secs(30),
        }
    }
}

impl FetchConfig {
    pub fn from_vars(vars: &Vars) -> Result<Self> {
        let defaults = Self::default();

        let page_size = parse_number(vars, "RECAP_PAGE_SIZE")?.unwrap_or(defaults.page_size);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(RecapError::config(format!(
                "RECAP_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        let max_pages = parse_number(vars, "RECAP_MAX_PAGES")?.unwrap_or(defaults.max_pages);
        if max_pages == 0 {
            return Err(RecapError::config("RECAP_MAX_PAGES must be at least 1"));
        }

        let timeout = parse_number::<u64>(vars, "RECAP_HTTP_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Ok(Self {
            page_size,
            max_pages,
            timeout,
        })
    }
}
