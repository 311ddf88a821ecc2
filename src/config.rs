// src/config.rs
// =============================================================================
// Typed crawl settings.
//
// The CLI (src/cli.rs) deals in raw flags like `--depth 3` or a missing
// `--timeout`. The engine never sees those: it gets a CrawlConfig where
// "no limit" is an explicit enum variant instead of an absent value.
//
// Rust concepts:
// - Enums with data: DepthLimit::Limited(3) vs DepthLimit::Unbounded
// - Default trait: sensible values for tests and library callers
// - Copy: small value types can be copied instead of moved
// =============================================================================

use std::time::Duration;

/// Default number of concurrent crawl workers
pub const DEFAULT_WORKERS: usize = 10;

/// Default number of redirect hops followed before giving up
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Sent with every HTTP request. Some sites refuse obvious bots, so we look
/// like a desktop browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/98.0.4758.102 Safari/537.36";

/// How far from the seed the crawler keeps expanding links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthLimit {
    /// Follow links until the site is exhausted
    Unbounded,
    /// Expand pages whose depth is below this value.
    /// Pages at exactly this depth are still fetched, just not expanded.
    Limited(usize),
}

impl DepthLimit {
    /// Returns true if links found on a page at `depth` should be followed
    pub fn allows_expansion(&self, depth: usize) -> bool {
        match self {
            DepthLimit::Unbounded => true,
            DepthLimit::Limited(max) => depth < *max,
        }
    }
}

impl From<Option<usize>> for DepthLimit {
    fn from(value: Option<usize>) -> Self {
        value.map_or(DepthLimit::Unbounded, DepthLimit::Limited)
    }
}

/// Per-fetch timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTimeout {
    /// Wait as long as the server takes
    Never,
    After(Duration),
}

impl FetchTimeout {
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            FetchTimeout::Never => None,
            FetchTimeout::After(duration) => Some(*duration),
        }
    }
}

impl From<Option<u64>> for FetchTimeout {
    fn from(secs: Option<u64>) -> Self {
        secs.map_or(FetchTimeout::Never, |s| {
            FetchTimeout::After(Duration::from_secs(s))
        })
    }
}

/// Everything the crawl engine needs to know
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub depth: DepthLimit,
    pub workers: usize,
    pub timeout: FetchTimeout,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            depth: DepthLimit::Unbounded,
            workers: DEFAULT_WORKERS,
            timeout: FetchTimeout::Never,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not just Option<usize> for the depth?
//    - Option works, but `None` reads as "not set" rather than "no limit"
//    - DepthLimit::Unbounded says exactly what it means at every call site
//    - The From<Option<usize>> impl lets the CLI keep using Option
//
// 2. What does map_or do?
//    - opt.map_or(default, f) = if Some(x) then f(x) else default
//    - Handy for converting an Option into another type in one line
// -----------------------------------------------------------------------------
