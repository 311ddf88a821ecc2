// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// Only two kinds of error ever reach the caller:
// - CrawlError::Startup: the seed address is unusable, nothing was crawled
// - ReportError: the crawl finished but the report could not be written
//
// Everything that goes wrong for a single link (bad href, other domain,
// 404, connection refused) is absorbed by the crawler and ends up either
// as a report row or as a debug log line.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - #[from]: lets the ? operator convert foreign errors automatically
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The string could not be parsed or resolved as a URL
    #[error("invalid URL '{raw}': {reason}")]
    InvalidUrl { raw: String, reason: String },

    /// Parsed fine, but we only know how to visit http, https and file
    #[error("unsupported scheme '{scheme}' in '{raw}'")]
    UnsupportedScheme { raw: String, scheme: String },

    /// The seed address is unusable, the crawl never started
    #[error("cannot start crawl: {0}")]
    Startup(String),
}

/// Failures of the report writers
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
