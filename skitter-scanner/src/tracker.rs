use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts outstanding traversal tasks so the caller can wait for a run of
/// unknown size to finish.
///
/// A unit is registered by whoever is about to start a task, before the task
/// is scheduled. The returned [`PendingTask`] travels with the task and
/// deregisters the unit when it is dropped, which covers every exit path of
/// the task (including unwinding) exactly once.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    pending: AtomicUsize,
    registered: AtomicUsize,
    deregistered: AtomicUsize,
    idle: Notify,
}

/// Register/deregister totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerStats {
    pub registered: usize,
    pub deregistered: usize,
}

impl CompletionTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds one pending unit. Must be called before the task it stands for
    /// can possibly run.
    #[must_use = "dropping the token immediately deregisters the unit"]
    pub fn register(self: &Arc<Self>) -> PendingTask {
        self.registered.fetch_add(1, Ordering::Relaxed);
        self.pending.fetch_add(1, Ordering::AcqRel);
        PendingTask {
            tracker: Arc::clone(self),
        }
    }

    fn deregister(&self) {
        self.deregistered.fetch_add(1, Ordering::Relaxed);
        let previous = self.pending.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "pending count went negative");
        if previous == 1 {
            self.idle.notify_waiters();
        }
    }

    /// Number of registered units that have not finished yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            registered: self.registered.load(Ordering::Relaxed),
            deregistered: self.deregistered.load(Ordering::Relaxed),
        }
    }

    /// Resolves once the pending count is zero.
    ///
    /// Returns immediately if nothing was ever registered, so the root task
    /// has to be registered before this is awaited.
    pub async fn wait_until_idle(&self) {
        loop {
            // Arm the notification before reading the count so a deregister
            // landing in between is not missed.
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

/// Token for one registered unit of work. Deregisters on drop.
#[derive(Debug)]
pub struct PendingTask {
    tracker: Arc<CompletionTracker>,
}

impl Drop for PendingTask {
    fn drop(&mut self) {
        self.tracker.deregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_register_and_drop_balance() {
        let tracker = CompletionTracker::new();
        let first = tracker.register();
        let second = tracker.register();
        assert_eq!(tracker.pending(), 2);

        drop(first);
        assert_eq!(tracker.pending(), 1);
        drop(second);
        assert!(tracker.is_idle());

        assert_eq!(
            tracker.stats(),
            TrackerStats {
                registered: 2,
                deregistered: 2
            }
        );
    }

    #[tokio::test]
    async fn test_wait_returns_when_nothing_registered() {
        let tracker = CompletionTracker::new();
        tokio::time::timeout(Duration::from_secs(1), tracker.wait_until_idle())
            .await
            .expect("idle tracker should not block");
    }

    #[tokio::test]
    async fn test_wait_blocks_until_last_token_dropped() {
        let tracker = CompletionTracker::new();
        let token = tracker.register();

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.wait_until_idle().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished(), "wait must not end while work is pending");

        drop(token);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait should end after the last deregister")
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_nested_registration_keeps_count_positive() {
        let tracker = CompletionTracker::new();
        let root = tracker.register();

        // Each task registers its children before it finishes, the same way a
        // traversal task does.
        let handle = {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                let _root = root;
                for _ in 0..8 {
                    let child = tracker.register();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        drop(child);
                    });
                }
            })
        };

        tracker.wait_until_idle().await;
        handle.await.unwrap();

        assert_eq!(tracker.pending(), 0);
        assert_eq!(tracker.stats().registered, 9);
        assert_eq!(tracker.stats().deregistered, 9);
    }

    #[tokio::test]
    async fn test_token_released_on_panic() {
        let tracker = CompletionTracker::new();
        let token = tracker.register();

        let result = tokio::spawn(async move {
            let _token = token;
            panic!("task blew up");
        })
        .await;

        assert!(result.is_err());
        assert!(tracker.is_idle());
    }
}
