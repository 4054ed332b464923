use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use skitter_scanner::{
    ClaimPolicy, CrawlEvent, CrawlOutcome, Crawler, EventCallback, Fetcher, ProgressCallback,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub roots: Vec<String>,
    pub max_depth: usize,
    pub claim_policy: ClaimPolicy,
    pub show_progress_bars: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            max_depth: 4,
            claim_policy: ClaimPolicy::OnSpawn,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL, or return the identifier unchanged
/// if it is not a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .filter(|u| u.has_host())
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Parse a claim policy name as accepted on the command line
pub fn parse_claim_policy(name: &str) -> Option<ClaimPolicy> {
    match name.to_lowercase().as_str() {
        "on-spawn" | "spawn" => Some(ClaimPolicy::OnSpawn),
        "on-fetch" | "fetch" => Some(ClaimPolicy::OnFetch),
        _ => None,
    }
}

/// Crawl every root with `fetcher`. Each root is its own run, with its own
/// visited set, and the runs proceed concurrently.
pub async fn execute_crawl(
    options: CrawlOptions,
    fetcher: Arc<dyn Fetcher>,
    progress_callback: Option<CrawlProgressCallback>,
    event_callback: Option<EventCallback>,
) -> Vec<CrawlOutcome> {
    let CrawlOptions {
        roots,
        max_depth,
        claim_policy,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let fetched_count = Arc::new(AtomicUsize::new(0));

    let task_progress: ProgressCallback = {
        let pb = progress_bar.clone();
        let count = fetched_count.clone();
        Arc::new(move |id: &str, depth: usize| {
            let fetched = count.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb {
                pb.set_message(format!(
                    "Crawling... {} fetched, now {} (depth {})",
                    fetched,
                    extract_url_path(id),
                    depth
                ));
            }
        })
    };

    let mut crawler = Crawler::new(fetcher)
        .with_max_depth(max_depth)
        .with_claim_policy(claim_policy)
        .with_progress_callback(task_progress);
    if let Some(cb) = event_callback {
        crawler = crawler.with_event_callback(cb);
    }

    if let Some(ref callback) = progress_callback
        && roots.len() > 1
    {
        callback(format!("Crawling {} roots", roots.len()));
    }

    let crawler = &crawler;
    let progress_callback = &progress_callback;
    let outcomes = join_all(roots.iter().map(|root| async move {
        let outcome = crawler.crawl(root).await;
        if let Some(callback) = progress_callback {
            callback(format!(
                "Finished {}: {} pages, {} failures",
                root,
                outcome.found().count(),
                outcome.failed().count()
            ));
        }
        outcome
    }))
    .await;

    let total = fetched_count.load(Ordering::Relaxed);
    info!("All crawls complete. {} fetch attempts", total);
    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!("Crawl complete! {} fetch attempts", total));
    }

    outcomes
}

/// Split every event across outcomes into `(found, failed)`
pub fn partition_events(outcomes: &[CrawlOutcome]) -> (Vec<&CrawlEvent>, Vec<&CrawlEvent>) {
    outcomes
        .iter()
        .flat_map(|o| o.events.iter())
        .partition(|e| e.is_found())
}
