// src/crawl/visited.rs
// =============================================================================
// The visited registry: the single place where duplicate work is stopped.
//
// Every address goes through try_admit() before it is queued. Only the first
// caller for a given key gets `true`, so each page is fetched once and shows
// up in the report once, no matter how many pages link to it or how many
// workers find it at the same moment.
//
// Rust concepts:
// - DashSet: a HashSet split into shards, each with its own lock
// - &self methods on shared data: no &mut needed, the set locks internally
// =============================================================================

use dashmap::DashSet;

use super::normalize::NormalizedUrl;

#[derive(Debug, Default)]
pub struct VisitedRegistry {
    admitted: DashSet<NormalizedUrl>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `address` if it was never admitted before.
    ///
    /// Check and insert happen under one shard lock, so concurrent callers
    /// with the same address see exactly one `true`.
    pub fn try_admit(&self, address: &NormalizedUrl) -> bool {
        self.admitted.insert(address.clone())
    }

    pub fn len(&self) -> usize {
        self.admitted.len()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not `if !set.contains(x) { set.insert(x) }`?
//    - Between contains() and insert() another worker could insert the same
//      address, and both would think they were first
//    - insert() returns whether the value was new, in one locked step
//
// 2. Why DashSet instead of Mutex<HashSet>?
//    - A Mutex locks the whole set for every lookup
//    - DashSet only locks the shard the key hashes to, so workers checking
//      different addresses rarely wait on each other
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::normalize::normalize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn url(raw: &str) -> NormalizedUrl {
        normalize(raw, None).unwrap()
    }

    #[test]
    fn test_first_admission_wins() {
        let registry = VisitedRegistry::new();
        assert!(registry.try_admit(&url("https://a.com/x")));
        assert!(!registry.try_admit(&url("https://a.com/x")));
        assert!(!registry.try_admit(&url("https://www.a.com/x/#top")));
        assert!(registry.try_admit(&url("https://a.com/y")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_admission_is_exactly_once() {
        let registry = Arc::new(VisitedRegistry::new());
        let winners = Arc::new(AtomicUsize::new(0));
        let address = url("https://a.com/contended");

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let winners = Arc::clone(&winners);
                let address = address.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if registry.try_admit(&address) {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }
}
