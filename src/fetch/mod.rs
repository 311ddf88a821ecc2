// src/fetch/mod.rs
// =============================================================================
// This module retrieves one address and says what happened.
//
// Submodules:
// - http: http(s):// addresses, following redirects by hand so we can
//   report every hop of the chain
// - file: file:// addresses, read straight from disk
//
// The fetcher never returns an error to its caller. A refused connection or
// an unreadable file is a perfectly good answer for a link auditor: it
// becomes FetchStatus::Error in the report, next to the 404s.
// =============================================================================

mod file;
mod http;

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::config::CrawlConfig;
use crate::crawl::NormalizedUrl;
use crate::error::{CrawlError, Result};

/// What a fetch ended with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// An HTTP status code, or a synthetic one for local files
    /// (200 readable, 404 missing)
    Code(u16),
    /// No status at all: connection refused, timeout, I/O error...
    Error(String),
}

impl FetchStatus {
    /// True for error markers and 4xx/5xx codes
    pub fn is_broken(&self) -> bool {
        match self {
            FetchStatus::Code(code) => *code >= 400,
            FetchStatus::Error(_) => true,
        }
    }

    /// Status as written in the report. Errors have no code, we write 0.
    pub fn code(&self) -> u16 {
        match self {
            FetchStatus::Code(code) => *code,
            FetchStatus::Error(_) => 0,
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Code(code) => write!(f, "{}", code),
            FetchStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// One redirect response on the way to the final address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hop {
    pub url: String,
    pub status: u16,
}

/// Everything a fetch produced
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Status of the last response (or the error that stopped us)
    pub status: FetchStatus,
    /// Where we ended up after redirects, exactly as the server spelled it.
    /// Relative links on the page resolve against this, not the
    /// normalized key.
    pub final_url: Url,
    /// Redirect responses in order, empty when there were none
    pub redirects: Vec<Hop>,
    /// Page text, only for HTML documents
    pub body: Option<String>,
}

impl FetchOutcome {
    fn failed(final_url: Url, redirects: Vec<Hop>, message: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::Error(message.into()),
            final_url,
            redirects,
            body: None,
        }
    }
}

/// Retrieves http(s) and file addresses.
///
/// Cheap to clone: the reqwest client inside is reference counted.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_redirects: usize,
}

impl Fetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = http::build_client(config)
            .map_err(|e| CrawlError::Startup(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_redirects: config.max_redirects,
        })
    }

    pub async fn fetch(&self, address: &NormalizedUrl) -> FetchOutcome {
        if address.is_file() {
            file::fetch(address.as_url()).await
        } else {
            http::fetch(&self.client, address.as_url(), self.max_redirects).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_statuses() {
        assert!(!FetchStatus::Code(200).is_broken());
        assert!(!FetchStatus::Code(301).is_broken());
        assert!(FetchStatus::Code(404).is_broken());
        assert!(FetchStatus::Code(503).is_broken());
        assert!(FetchStatus::Error("refused".to_string()).is_broken());
    }

    #[test]
    fn test_error_is_reported_as_zero() {
        assert_eq!(FetchStatus::Error("timeout".to_string()).code(), 0);
        assert_eq!(FetchStatus::Code(404).code(), 404);
        assert_eq!(FetchStatus::Code(404).to_string(), "404");
    }
}
