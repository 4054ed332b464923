use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Insert-only set of identifiers that have already been claimed by a run.
///
/// The membership test and the insertion happen under one lock, so two
/// concurrent claims for the same identifier can never both succeed.
#[derive(Debug, Default)]
pub struct VisitedGuard {
    visited: Mutex<HashSet<String>>,
}

impl VisitedGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id` for the caller. Returns `true` only for the first claim.
    pub fn try_claim(&self, id: &str) -> bool {
        let mut visited = self.lock();
        if visited.contains(id) {
            false
        } else {
            visited.insert(id.to_string())
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries are never removed, so a poisoned set is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_claim_wins() {
        let guard = VisitedGuard::new();
        assert!(guard.try_claim("a"));
        assert!(!guard.try_claim("a"));
        assert!(guard.try_claim("b"));
        assert_eq!(guard.len(), 2);
        assert!(guard.contains("a"));
        assert!(!guard.contains("c"));
    }

    #[test]
    fn test_empty_guard() {
        let guard = VisitedGuard::new();
        assert!(guard.is_empty());
        assert!(!guard.contains(""));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_claims_have_one_winner() {
        let guard = Arc::new(VisitedGuard::new());

        let mut handles = Vec::new();
        for _ in 0..64 {
            let guard = guard.clone();
            handles.push(tokio::spawn(async move { guard.try_claim("contested") }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1, "exactly one claim should succeed");
        assert_eq!(guard.len(), 1);
    }
}
