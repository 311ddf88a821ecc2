// src/crawl/frontier.rs
// =============================================================================
// The frontier: a shared FIFO queue of (address, depth) pairs.
//
// FIFO order is what makes the crawl breadth-first: every page at depth d is
// queued before the pages it links to at depth d + 1.
//
// FIFO alone is not enough once several workers run at the same time: a
// fast depth-2 page could be expanded while a slow depth-1 page is still
// loading, and any link the two share would be admitted one layer too deep.
// So the frontier hands out an entry only when no shallower entry is still
// in flight. Layer d + 1 starts once every page of layer d is done.
//
// The frontier also answers the hard question of a concurrent crawl:
// "are we done?". An empty queue alone is not enough, a worker that is still
// fetching might push new links a second later. So the queue and the
// in-flight counts live under the same lock, and the crawl is finished
// only when both are zero at the same moment.
//
// Rust concepts:
// - RAII guards: Claim decrements the in-flight count in its Drop impl,
//   so a worker can't forget to do it (not even when it panics)
// - tokio::sync::Notify: wakes idle workers when new work shows up
// =============================================================================

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

use super::normalize::NormalizedUrl;

/// Upper bound on how long an idle worker sleeps before looking again
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub address: NormalizedUrl,
    /// Link hops from the seed (the seed itself is 0)
    pub depth: usize,
}

#[derive(Debug, Default)]
struct State {
    queue: VecDeque<FrontierEntry>,
    /// depth -> number of claims out at that depth (no zero entries)
    in_flight: BTreeMap<usize, usize>,
    closed: bool,
}

impl State {
    fn shallowest_in_flight(&self) -> Option<usize> {
        self.in_flight.keys().next().copied()
    }
}

/// Result of a non-blocking pop
pub enum Pop<'a> {
    /// An entry, now counted as in flight until the claim is dropped
    Ready(Claim<'a>),
    /// Nothing available yet: the queue is empty, or its head belongs to a
    /// deeper layer than an entry still in flight
    Empty,
    /// Nothing queued, nothing in flight (or the frontier was closed)
    Drained,
}

#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<State>,
    changed: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking worker can't leave the queue half-updated (every critical
    // section is a single push/pop), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an entry. Ignored once the frontier is closed.
    pub fn push(&self, entry: FrontierEntry) {
        {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.queue.push_back(entry);
        }
        self.changed.notify_waiters();
    }

    /// Takes the oldest entry without waiting, if its layer is open
    pub fn try_pop(&self) -> Pop<'_> {
        let mut state = self.lock();
        if state.closed {
            return Pop::Drained;
        }

        let Some(depth) = state.queue.front().map(|entry| entry.depth) else {
            return if state.in_flight.is_empty() {
                Pop::Drained
            } else {
                Pop::Empty
            };
        };

        // A shallower page may still link here, wait for its layer to finish
        if state.shallowest_in_flight().is_some_and(|open| open < depth) {
            return Pop::Empty;
        }

        match state.queue.pop_front() {
            Some(entry) => {
                *state.in_flight.entry(entry.depth).or_insert(0) += 1;
                Pop::Ready(Claim {
                    entry,
                    frontier: self,
                })
            }
            None => Pop::Empty,
        }
    }

    /// Waits for the next entry.
    ///
    /// Returns None once the crawl is over: the queue is empty with nothing
    /// in flight, or close() was called.
    pub async fn next(&self) -> Option<Claim<'_>> {
        loop {
            // Register interest before looking, so a push that lands between
            // the look and the wait still wakes us.
            let notified = self.changed.notified();
            match self.try_pop() {
                Pop::Ready(claim) => return Some(claim),
                Pop::Drained => return None,
                Pop::Empty => {}
            }
            let _ = tokio::time::timeout(POLL_INTERVAL, notified).await;
        }
    }

    /// Stops handing out work. Queued entries are dropped, workers waiting
    /// in next() wake up and get None.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
            state.queue.clear();
        }
        self.changed.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of entries waiting (not counting in-flight ones)
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    fn finish_one(&self, depth: usize) {
        {
            let mut state = self.lock();
            if let Some(count) = state.in_flight.get_mut(&depth) {
                *count -= 1;
                if *count == 0 {
                    state.in_flight.remove(&depth);
                }
            }
        }
        self.changed.notify_waiters();
    }
}

/// An entry checked out of the frontier.
///
/// While a Claim is alive the frontier can't report itself drained, which
/// gives the owner time to push the links it finds.
pub struct Claim<'a> {
    entry: FrontierEntry,
    frontier: &'a Frontier,
}

impl Claim<'_> {
    pub fn entry(&self) -> &FrontierEntry {
        &self.entry
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.frontier.finish_one(self.entry.depth);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is VecDeque?
//    - A double-ended queue
//    - push_back() adds to the end, pop_front() removes from the start
//    - That's FIFO order, perfect for breadth-first search
//    - Children are always pushed one layer deeper than the entry being
//      processed, and only the shallowest open layer is processed, so the
//      queue stays sorted by depth
//
// 2. Why a BTreeMap for the in-flight counts?
//    - Its keys are kept sorted, so keys().next() is the shallowest layer
//      that still has work out
//
// 3. Why not block forever in next()?
//    - If the queue is empty and every worker is waiting, nobody will ever
//      push again: a blocking pop would deadlock
//    - Instead each wait is bounded by POLL_INTERVAL, and the in-flight
//      count tells us when waiting is pointless
//
// 4. What is Claim<'a>?
//    - A struct that borrows the frontier ('a is how long the borrow lasts)
//    - When the claim is dropped, Drop::drop runs and the in-flight count
//      goes down. This is called RAII (resource acquisition is init)
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::normalize::normalize;
    use std::sync::Arc;

    fn entry(raw: &str, depth: usize) -> FrontierEntry {
        FrontierEntry {
            address: normalize(raw, None).unwrap(),
            depth,
        }
    }

    fn address_of(pop: Pop<'_>) -> String {
        match pop {
            Pop::Ready(claim) => claim.entry().address.to_string(),
            Pop::Empty => "<empty>".to_string(),
            Pop::Drained => "<drained>".to_string(),
        }
    }

    #[test]
    fn test_fifo_order() {
        let frontier = Frontier::new();
        frontier.push(entry("https://a.com/1", 0));
        frontier.push(entry("https://a.com/2", 1));
        frontier.push(entry("https://a.com/3", 1));

        assert_eq!(address_of(frontier.try_pop()), "https://a.com/1");
        assert_eq!(address_of(frontier.try_pop()), "https://a.com/2");
        assert_eq!(address_of(frontier.try_pop()), "https://a.com/3");
        assert_eq!(address_of(frontier.try_pop()), "<drained>");
    }

    #[test]
    fn test_empty_while_claim_is_held() {
        let frontier = Frontier::new();
        frontier.push(entry("https://a.com/", 0));

        let claim = match frontier.try_pop() {
            Pop::Ready(claim) => claim,
            _ => panic!("expected an entry"),
        };
        assert!(matches!(frontier.try_pop(), Pop::Empty));

        frontier.push(entry("https://a.com/child", 1));
        drop(claim);

        assert_eq!(address_of(frontier.try_pop()), "https://a.com/child");
        assert!(matches!(frontier.try_pop(), Pop::Drained));
    }

    #[test]
    fn test_next_layer_waits_for_current_layer() {
        let frontier = Frontier::new();
        frontier.push(entry("https://a.com/slow", 1));
        frontier.push(entry("https://a.com/fast", 1));

        let slow = match frontier.try_pop() {
            Pop::Ready(claim) => claim,
            _ => panic!("expected an entry"),
        };
        // The fast page finishes and queues its child
        let fast = match frontier.try_pop() {
            Pop::Ready(claim) => claim,
            _ => panic!("expected an entry"),
        };
        frontier.push(entry("https://a.com/deep", 2));
        drop(fast);

        // The slow depth-1 page is still out, depth 2 is not handed out yet
        assert!(matches!(frontier.try_pop(), Pop::Empty));
        assert_eq!(frontier.queued(), 1);

        drop(slow);
        assert_eq!(address_of(frontier.try_pop()), "https://a.com/deep");
        assert!(matches!(frontier.try_pop(), Pop::Drained));
    }

    #[test]
    fn test_close_drops_queue_and_refuses_pushes() {
        let frontier = Frontier::new();
        frontier.push(entry("https://a.com/", 0));
        frontier.close();
        frontier.push(entry("https://a.com/late", 1));

        assert!(frontier.is_closed());
        assert_eq!(frontier.queued(), 0);
        assert!(matches!(frontier.try_pop(), Pop::Drained));
    }

    #[tokio::test]
    async fn test_next_waits_for_in_flight_pushes() {
        let frontier = Arc::new(Frontier::new());
        frontier.push(entry("https://a.com/", 0));

        let claim = frontier.next().await.expect("seed entry");
        assert_eq!(claim.entry().depth, 0);

        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move {
                frontier
                    .next()
                    .await
                    .map(|claim| claim.entry().address.to_string())
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        frontier.push(entry("https://a.com/late", 1));
        drop(claim);

        assert_eq!(waiter.await.unwrap().as_deref(), Some("https://a.com/late"));
        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn test_close_wakes_waiters() {
        let frontier = Arc::new(Frontier::new());
        frontier.push(entry("https://a.com/", 0));
        let _claim = frontier.next().await.expect("seed entry");

        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.next().await.is_none() })
        };

        frontier.close();
        assert!(waiter.await.unwrap());
    }
}
