use betstats_core::RecordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("login rejected (status: {0})")]
    AuthRejected(String),

    #[error("malformed transaction #{index} on page {page}: {source}")]
    Decode {
        page: u32,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid transaction #{index} on page {page}: {source}")]
    Invalid {
        page: u32,
        index: usize,
        #[source]
        source: RecordError,
    },
}
