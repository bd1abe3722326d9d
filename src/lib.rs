//! Collect a year's completed Jira tickets and merged GitHub pull requests
//! into plain-text reports.

pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod http;
pub mod logging;
pub mod model;
pub mod output;
pub mod paginate;
pub mod providers;
pub mod recap;
pub mod util;

pub use error::{RecapError, Result};
pub use recap::run;
