use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single fetch. Always local to the task that received it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    #[error("already visited {0}")]
    AlreadyVisited(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl FetchError {
    /// Short label used when grouping failures in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::AlreadyVisited(_) => "already visited",
            FetchError::NotFound(_) => "not found",
            FetchError::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
