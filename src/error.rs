use reqwest::StatusCode;

/// Every failure a recap run can hit. All of them are fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum RecapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{provider} rejected the credentials ({status}): {body}")]
    Authentication {
        provider: String,
        status: StatusCode,
        body: String,
    },

    #[error("{provider} rate limit exceeded ({status}): {body}")]
    RateLimit {
        provider: String,
        status: StatusCode,
        body: String,
    },

    #[error("{provider} request failed ({status}): {body}")]
    Http {
        provider: String,
        status: StatusCode,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected {provider} response: {message}")]
    DataShape { provider: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecapError>;

impl RecapError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn data_shape(provider: &str, message: impl Into<String>) -> Self {
        Self::DataShape {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
