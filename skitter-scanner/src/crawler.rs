use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::result::{CrawlEvent, CrawlOutcome};
use crate::tracker::{CompletionTracker, PendingTask};
use crate::visited::VisitedGuard;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Called with every event as soon as a task produces it.
pub type EventCallback = Arc<dyn Fn(&CrawlEvent) + Send + Sync>;
/// Called with `(id, remaining_depth)` when a task starts fetching.
pub type ProgressCallback = Arc<dyn Fn(&str, usize) + Send + Sync>;

/// Where an identifier gets claimed in the visited set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimPolicy {
    /// The parent claims each link before registering and spawning its task.
    /// Links that lose the claim never start.
    #[default]
    OnSpawn,
    /// Every link gets a task; the task claims its identifier right before
    /// fetching and reports `AlreadyVisited` if it lost.
    OnFetch,
}

/// One unit of traversal work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalTask {
    pub id: String,
    pub remaining_depth: usize,
}

impl TraversalTask {
    pub fn new(id: impl Into<String>, remaining_depth: usize) -> Self {
        Self {
            id: id.into(),
            remaining_depth,
        }
    }
}

/// How a task left the `Fetching` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskExit {
    DepthExhausted,
    Failed,
    Expanded { spawned: usize },
}

pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    max_depth: usize,
    claim_policy: ClaimPolicy,
    event_callback: Option<EventCallback>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            max_depth: 4,
            claim_policy: ClaimPolicy::default(),
            event_callback: None,
            progress_callback: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_claim_policy(mut self, policy: ClaimPolicy) -> Self {
        self.claim_policy = policy;
        self
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn claim_policy(&self) -> ClaimPolicy {
        self.claim_policy
    }

    /// Crawls everything reachable from `root` within the configured depth
    /// and returns once every spawned task has finished.
    ///
    /// Each call is an independent run with its own visited set and tracker.
    pub async fn crawl(&self, root: &str) -> CrawlOutcome {
        info!(
            "Starting crawl of {} (max depth {}, claim {:?})",
            root, self.max_depth, self.claim_policy
        );
        let started = Instant::now();

        let run = Arc::new(CrawlRun {
            fetcher: Arc::clone(&self.fetcher),
            visited: VisitedGuard::new(),
            tracker: CompletionTracker::new(),
            events: Mutex::new(Vec::new()),
            claim_policy: self.claim_policy,
            event_callback: self.event_callback.clone(),
            progress_callback: self.progress_callback.clone(),
        });

        let root_task = TraversalTask::new(root, self.max_depth);
        if run.claims_at_spawn(&root_task) {
            run.visited.try_claim(root);
        }
        let pending = run.tracker.register();
        run.spawn(root_task, pending);

        run.tracker.wait_until_idle().await;

        let events = run.take_events();
        let stats = run.tracker.stats();
        let outcome = CrawlOutcome {
            root: root.to_string(),
            max_depth: self.max_depth,
            events,
            stats,
            elapsed: started.elapsed(),
        };

        info!(
            "Crawl of {} complete. {} pages found, {} failures, {} tasks",
            root,
            outcome.found().count(),
            outcome.failed().count(),
            stats.registered
        );
        outcome
    }
}

/// State shared by every task of a single run.
struct CrawlRun {
    fetcher: Arc<dyn Fetcher>,
    visited: VisitedGuard,
    tracker: Arc<CompletionTracker>,
    events: Mutex<Vec<CrawlEvent>>,
    claim_policy: ClaimPolicy,
    event_callback: Option<EventCallback>,
    progress_callback: Option<ProgressCallback>,
}

impl CrawlRun {
    /// Depth-exhausted tasks never fetch, so they must not take the claim
    /// away from a path that could still reach the page with depth to spare.
    fn claims_at_spawn(&self, task: &TraversalTask) -> bool {
        self.claim_policy == ClaimPolicy::OnSpawn && task.remaining_depth > 0
    }

    /// Schedules `task`. The caller has already registered it; `pending` is
    /// that registration and is released when the task finishes.
    fn spawn(self: &Arc<Self>, task: TraversalTask, pending: PendingTask) {
        let run = Arc::clone(self);
        tokio::spawn(run.run_task(task, pending));
    }

    async fn run_task(self: Arc<Self>, task: TraversalTask, pending: PendingTask) {
        let exit = self.execute(&task).await;
        debug!(
            "Task {} (depth {}) finished: {:?}",
            task.id, task.remaining_depth, exit
        );
        drop(pending);
    }

    async fn execute(self: &Arc<Self>, task: &TraversalTask) -> TaskExit {
        if task.remaining_depth == 0 {
            return TaskExit::DepthExhausted;
        }

        if self.claim_policy == ClaimPolicy::OnFetch && !self.visited.try_claim(&task.id) {
            debug!("Skipping {}: already claimed by another task", task.id);
            self.emit(CrawlEvent::Failed {
                id: task.id.clone(),
                depth: task.remaining_depth,
                error: FetchError::AlreadyVisited(task.id.clone()),
            });
            return TaskExit::Failed;
        }

        if let Some(callback) = &self.progress_callback {
            callback(&task.id, task.remaining_depth);
        }

        let started = Instant::now();
        let result = match self.fetcher.fetch(&task.id).await {
            Ok(result) => result,
            Err(error) => {
                match &error {
                    FetchError::AlreadyVisited(_) => {
                        debug!("Fetch of {} rejected: {}", task.id, error)
                    }
                    _ => warn!("Crawl error for {}: {}", task.id, error),
                }
                self.emit(CrawlEvent::Failed {
                    id: task.id.clone(),
                    depth: task.remaining_depth,
                    error,
                });
                return TaskExit::Failed;
            }
        };

        let links = result.links;
        self.emit(CrawlEvent::Found {
            id: task.id.clone(),
            body: result.body,
            depth: task.remaining_depth,
            links_found: links.len(),
            response_time: started.elapsed(),
        });

        let child_depth = task.remaining_depth - 1;
        let mut spawned = 0;
        for link in links {
            let child = TraversalTask::new(link, child_depth);
            if self.claims_at_spawn(&child) && !self.visited.try_claim(&child.id) {
                debug!("Not following {} from {}: already claimed", child.id, task.id);
                continue;
            }

            // Register before the child is scheduled, so the count cannot
            // reach zero while the child is still queued.
            let pending = self.tracker.register();
            debug!("Spawning {} (depth {}) from {}", child.id, child_depth, task.id);
            self.spawn(child, pending);
            spawned += 1;
        }

        TaskExit::Expanded { spawned }
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(callback) = &self.event_callback {
            callback(&event);
        }
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    fn take_events(&self) -> Vec<CrawlEvent> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}
