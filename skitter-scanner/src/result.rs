use crate::error::FetchError;
use crate::tracker::TrackerStats;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a fetcher hands back for one identifier: the page body and its
/// outbound links, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub body: String,
    pub links: Vec<String>,
}

impl FetchResult {
    pub fn new(body: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            body: body.into(),
            links,
        }
    }
}

/// One observation emitted by a traversal task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    Found {
        id: String,
        body: String,
        /// Remaining depth of the task that fetched the page.
        depth: usize,
        links_found: usize,
        response_time: Duration,
    },
    Failed {
        id: String,
        depth: usize,
        error: FetchError,
    },
}

impl CrawlEvent {
    pub fn id(&self) -> &str {
        match self {
            CrawlEvent::Found { id, .. } | CrawlEvent::Failed { id, .. } => id,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, CrawlEvent::Found { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            CrawlEvent::Failed { error, .. } => Some(error),
            CrawlEvent::Found { .. } => None,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub root: String,
    pub max_depth: usize,
    pub events: Vec<CrawlEvent>,
    pub stats: TrackerStats,
    pub elapsed: Duration,
}

impl CrawlOutcome {
    pub fn found(&self) -> impl Iterator<Item = &CrawlEvent> {
        self.events.iter().filter(|e| e.is_found())
    }

    pub fn failed(&self) -> impl Iterator<Item = &CrawlEvent> {
        self.events.iter().filter(|e| !e.is_found())
    }

    /// Identifiers of every successfully fetched page, in emission order.
    pub fn found_ids(&self) -> Vec<&str> {
        self.found().map(CrawlEvent::id).collect()
    }
}
