use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while fetching a page of titles.
///
/// None of these reach the user: the dispatcher logs them and swallows them.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request was superseded by a newer search.
    #[error("search cancelled by a newer request")]
    Cancelled,

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SearchError {
    /// Cancellation is expected traffic, not a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }
}
