use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{RecapError, Result};

const USER_AGENT: &str = concat!("work-recap/", env!("CARGO_PKG_VERSION"));

/// Longest error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 500;

pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Map a non-success response to the matching error kind.
pub async fn check_status(provider: &str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let throttled = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && rate_limit_exhausted(&resp));
    let body = resp.text().await.unwrap_or_default();
    let body: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
    let provider = provider.to_string();

    Err(if throttled {
        RecapError::RateLimit {
            provider,
            status,
            body,
        }
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        RecapError::Authentication {
            provider,
            status,
            body,
        }
    } else {
        RecapError::Http {
            provider,
            status,
            body,
        }
    })
}

fn rate_limit_exhausted(resp: &Response) -> bool {
    resp.headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
}

/// Check the status, then decode the body. Decode failures are data-shape errors.
pub async fn read_json<T: DeserializeOwned>(provider: &str, resp: Response) -> Result<T> {
    let resp = check_status(provider, resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| RecapError::data_shape(provider, e.to_string()))
}
