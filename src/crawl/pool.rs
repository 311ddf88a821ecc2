// src/crawl/pool.rs
// =============================================================================
// The crawl itself: a fixed pool of workers draining a shared frontier.
//
// How it works:
// 1. The seed is normalized, admitted and queued at depth 0
// 2. The seed is visited first, on its own: if it can't be reached at all
//    there is nothing to audit and we stop with an error
// 3. N workers start. Each one loops:
//      take an entry from the frontier (or stop if the crawl is over)
//      fetch it and record the result
//      if the page may be expanded, extract its links and queue every
//      address the visited registry admits, at depth + 1
// 4. When the frontier is drained (nothing queued, nothing in flight) every
//    worker exits and the collected records are returned
//
// The frontier opens layer d + 1 only once all of layer d is done, so every
// address is recorded at its shortest distance from the seed.
//
// A failed fetch is recorded once and never retried: the report *is* the
// list of problems.
//
// Rust concepts:
// - Arc: shared ownership of the frontier, registry and sink across tasks
// - tokio::spawn: each worker is an independent task, a slow server only
//   holds up the worker talking to it
// =============================================================================

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::frontier::{Frontier, FrontierEntry};
use super::normalize::{normalize, DomainScope, NormalizedUrl};
use super::visited::VisitedRegistry;
use crate::config::{CrawlConfig, DepthLimit};
use crate::error::{CrawlError, Result};
use crate::extract::extract_links;
use crate::fetch::{FetchStatus, Fetcher};
use crate::report::{CrawlSummary, ResultSink, VisitRecord};

/// Everything a finished crawl produced
#[derive(Debug)]
pub struct CrawlReport {
    /// One record per admitted address, sorted by address
    pub records: Vec<VisitRecord>,
    pub summary: CrawlSummary,
}

/// Stops a running crawl from the outside (e.g. on Ctrl-C).
///
/// Idle workers exit right away. Busy workers finish the fetch they are in
/// and exit without expanding the page.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    frontier: Arc<Frontier>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        if !self.frontier.is_closed() {
            warn!("Shutdown requested, stopping workers");
        }
        self.frontier.close();
    }
}

pub struct Crawler {
    seed: NormalizedUrl,
    workers: usize,
    worker: Arc<Worker>,
}

impl Crawler {
    // Prepares a crawl without touching the network
    //
    // Fails with CrawlError::Startup when the seed is not a usable URL, the
    // pool is empty, or the HTTP client can't be built.
    pub fn new(seed: &str, config: CrawlConfig) -> Result<Self> {
        let seed = normalize(seed, None).map_err(|e| CrawlError::Startup(e.to_string()))?;

        if config.workers == 0 {
            return Err(CrawlError::Startup(
                "worker count must be at least 1".to_string(),
            ));
        }

        let worker = Worker {
            fetcher: Fetcher::new(&config)?,
            scope: DomainScope::from_seed(&seed),
            depth: config.depth,
            frontier: Arc::new(Frontier::new()),
            visited: Arc::new(VisitedRegistry::new()),
            sink: Arc::new(ResultSink::new()),
        };

        Ok(Self {
            seed,
            workers: config.workers,
            worker: Arc::new(worker),
        })
    }

    pub fn seed(&self) -> &NormalizedUrl {
        &self.seed
    }

    pub fn scope(&self) -> &DomainScope {
        &self.worker.scope
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            frontier: Arc::clone(&self.worker.frontier),
        }
    }

    pub async fn run(self) -> Result<CrawlReport> {
        let started = Instant::now();
        let worker = self.worker;

        info!(
            "Starting crawl of {} (scope: {}, workers: {}, depth: {:?})",
            self.seed,
            worker.scope.name(),
            self.workers,
            worker.depth
        );

        worker.visited.try_admit(&self.seed);
        worker.frontier.push(FrontierEntry {
            address: self.seed.clone(),
            depth: 0,
        });

        if let Some(claim) = worker.frontier.next().await {
            let record = worker.process(claim.entry()).await;
            if let Some(reason) = unreachable_reason(&record) {
                worker.frontier.close();
                return Err(CrawlError::Startup(format!(
                    "seed {} is unreachable: {}",
                    self.seed, reason
                )));
            }
        }

        let handles: Vec<_> = (0..self.workers)
            .map(|id| tokio::spawn(Arc::clone(&worker).run(id)))
            .collect();

        for result in join_all(handles).await {
            if let Err(e) = result {
                error!("Crawl worker crashed: {}", e);
            }
        }

        let interrupted = worker.frontier.is_closed();
        let records = worker.sink.finish();
        let summary = CrawlSummary::from_records(&records, started.elapsed(), interrupted);

        info!(
            "Crawl finished in {:.2}s: {} address(es) visited, {} admitted",
            summary.elapsed.as_secs_f64(),
            summary.visited,
            worker.visited.len()
        );

        Ok(CrawlReport { records, summary })
    }
}

// A seed that never answered, or a local seed file that doesn't exist,
// leaves nothing to crawl
fn unreachable_reason(record: &VisitRecord) -> Option<String> {
    match &record.status {
        FetchStatus::Error(message) => Some(message.clone()),
        FetchStatus::Code(404) if record.address.is_file() => Some("file not found".to_string()),
        FetchStatus::Code(_) => None,
    }
}

/// State shared by every worker of one crawl
struct Worker {
    fetcher: Fetcher,
    scope: DomainScope,
    depth: DepthLimit,
    frontier: Arc<Frontier>,
    visited: Arc<VisitedRegistry>,
    sink: Arc<ResultSink>,
}

impl Worker {
    async fn run(self: Arc<Self>, id: usize) {
        debug!("Worker {} started", id);

        // The claim lives until the end of the loop body, so the frontier
        // can't look drained while this worker is still pushing children.
        while let Some(claim) = self.frontier.next().await {
            self.process(claim.entry()).await;
        }

        debug!("Worker {} finished", id);
    }

    async fn process(&self, entry: &FrontierEntry) -> VisitRecord {
        let outcome = self.fetcher.fetch(&entry.address).await;
        let record = VisitRecord::new(entry, &outcome);

        if record.redirects.is_empty() {
            info!(depth = entry.depth, "{} => [{}]", record.address, record.status);
        } else {
            info!(depth = entry.depth, "{}", record.redirect_chain());
        }
        self.sink.record(record.clone());

        // Pages at the depth limit are still audited, just not expanded
        if self.frontier.is_closed() || !self.depth.allows_expansion(entry.depth) {
            return record;
        }

        let Some(body) = outcome.body.as_deref() else {
            return record;
        };

        // A redirect may have taken us off the site, its links are not ours
        let landed_in_scope = normalize(outcome.final_url.as_str(), None)
            .map(|address| self.scope.contains(&address))
            .unwrap_or(false);
        if !landed_in_scope {
            debug!("Not expanding {}, it ended outside the site", entry.address);
            return record;
        }

        let mut queued = 0;
        for link in extract_links(body, &outcome.final_url, &self.scope) {
            if self.visited.try_admit(&link) {
                self.frontier.push(FrontierEntry {
                    address: link,
                    depth: entry.depth + 1,
                });
                queued += 1;
            }
        }
        debug!(
            "Queued {} new address(es) from {} ({} waiting)",
            queued,
            entry.address,
            self.frontier.queued()
        );

        record
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is `self: Arc<Self>`?
//    - A method receiver that takes an Arc instead of &self
//    - tokio::spawn needs a 'static future, so the task must own what it
//      uses. Cloning the Arc gives each worker its own handle to the state
//
// 2. Why admit before queueing instead of after fetching?
//    - If two workers find the same link at the same time and we checked
//      after fetching, both would fetch it and the report would have two rows
//    - try_admit() lets exactly one of them queue it
//
// 3. What is `let Some(body) = ... else { return ... };`?
//    - "let-else": bind the value if the pattern matches, otherwise run the
//      else block, which must leave the function (return, continue, ...)
//
// 4. What does join_all do?
//    - Waits for every future in a list and returns all their results
//    - A JoinHandle resolves to Err if the task panicked
// -----------------------------------------------------------------------------
