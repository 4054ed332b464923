pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod result;
pub mod tracker;
pub mod visited;

pub use crawler::{ClaimPolicy, Crawler, EventCallback, ProgressCallback, TraversalTask};
pub use error::{FetchError, ScanError};
pub use fetcher::{Fetcher, FixtureFetcher, FixturePage, HttpFetcher};
pub use result::{CrawlEvent, CrawlOutcome, FetchResult};
pub use tracker::{CompletionTracker, PendingTask, TrackerStats};
pub use visited::VisitedGuard;
