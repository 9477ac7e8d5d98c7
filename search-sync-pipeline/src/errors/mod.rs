//! Pipeline error types.

use search_sync_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur in the search sync pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A batch could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A search index call failed.
    #[error("Search index error: {0}")]
    SearchIndex(#[from] SearchIndexError),

    /// Reading a batch failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Split a JSON decoding error into an IO failure or a malformed batch.
    pub(crate) fn from_json(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::parse(err.to_string())
        }
    }
}
