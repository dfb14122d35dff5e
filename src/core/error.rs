//! Error taxonomy for series retrieval and commentary requests.

use thiserror::Error;

/// Failures while fetching, parsing or deriving a time series.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {code} for series: {id}")]
    Status { code: u16, id: String },

    #[error("Blocked response for series: {0}")]
    Blocked(String),

    #[error("Malformed response for series {id}: {reason}")]
    Malformed { id: String, reason: String },

    #[error("No data found for series: {0}")]
    NoData(String),

    #[error("Insufficient data points: needed {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Cache error: {0}")]
    Cache(String),
}

impl DataError {
    /// Transport failures and blocked or malformed responses are worth another attempt;
    /// everything else is final for the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataError::Transport(_)
                | DataError::Status { .. }
                | DataError::Blocked(_)
                | DataError::Malformed { .. }
        )
    }

    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        DataError::Malformed {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::Transport(err.to_string())
    }
}

/// Failures while requesting commentary from the chat-completion endpoint.
#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("No API key configured; set llm.api_key or OPENAI_API_KEY")]
    MissingCredential,

    #[error("Commentary request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Commentary endpoint returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Commentary response had no content")]
    EmptyResponse,
}
