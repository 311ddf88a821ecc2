// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Submodules, leaf to root:
// - normalize: canonical address keys and the domain scope
// - visited: the deduplication gate (each address admitted once)
// - frontier: the shared breadth-first work queue
// - pool: the worker pool that ties it all together
//
// Features:
// - Breadth-first crawling starting from a seed URL (http, https or file)
// - Same-domain restriction ("www." and fragments ignored)
// - Optional depth limit
// - Concurrent workers with clean termination and Ctrl-C shutdown
// =============================================================================

mod frontier;
mod normalize;
mod pool;
mod visited;

// Re-export what the rest of the application uses
pub use frontier::FrontierEntry;
pub use normalize::{normalize, DomainScope, NormalizedUrl};
pub use pool::Crawler;
