// src/crawl/normalize.rs
// =============================================================================
// This module turns any address we come across into a canonical key.
//
// Two links that point at the same page must produce the same key, or the
// crawler would fetch the page twice (and report it twice). The rules:
// - resolve relative links against the page they were found on
// - drop the #fragment (it never reaches the server)
// - drop a leading "www." from the host
// - lowercase scheme and host (the url crate already does this)
// - resolve "." and ".." path segments (the url crate already does this)
// - drop trailing slashes from the path, except for the root "/"
// - keep the query string, "?page=2" is a different resource
//
// Example:
//   https://www.Example.com/about/#team  =>  https://example.com/about
// =============================================================================

use serde::{Serialize, Serializer};
use std::fmt;
use url::Url;

use crate::error::{CrawlError, Result};

/// Schemes the fetcher knows how to visit
const SUPPORTED_SCHEMES: [&str; 3] = ["http", "https", "file"];

/// A canonical address, used as the identity of a page.
///
/// The only way to build one is through [`normalize`], so holding a
/// NormalizedUrl proves the rules above were applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn is_file(&self) -> bool {
        self.0.scheme() == "file"
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NormalizedUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Normalizes `raw`, resolving it against `base` when given.
//
// Parameters:
//   raw: the address as written (absolute, or relative when base is set)
//   base: the address of the page the link was found on
//
// Returns: the canonical address, or an error when the string is not a URL
// or uses a scheme we can't visit (mailto:, javascript:, ...)
pub fn normalize(raw: &str, base: Option<&Url>) -> Result<NormalizedUrl> {
    let trimmed = raw.trim();

    let parsed = match base {
        Some(base) => base.join(trimmed),
        None => Url::parse(trimmed),
    }
    .map_err(|e| CrawlError::InvalidUrl {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;

    canonicalize(parsed, raw)
}

fn canonicalize(mut url: Url, raw: &str) -> Result<NormalizedUrl> {
    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(CrawlError::UnsupportedScheme {
            raw: raw.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    url.set_fragment(None);

    if let Some(stripped) = url.host_str().and_then(strip_www) {
        url.set_host(Some(&stripped))
            .map_err(|e| CrawlError::InvalidUrl {
                raw: raw.to_string(),
                reason: e.to_string(),
            })?;
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/".to_string(),
            rest => rest.to_string(),
        };
        url.set_path(&trimmed);
    }

    // "?" with nothing after it is the same resource as no query at all
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(NormalizedUrl(url))
}

fn strip_www(host: &str) -> Option<String> {
    host.strip_prefix("www.")
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}

/// The part of the web the crawl is allowed to visit.
///
/// Derived once from the seed: its host (already without "www.") and port.
/// A `file://` seed scopes the crawl to local files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    host: String,
    port: Option<u16>,
    local: bool,
}

impl DomainScope {
    pub fn from_seed(seed: &NormalizedUrl) -> Self {
        let url = seed.as_url();
        Self {
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port(),
            local: seed.is_file(),
        }
    }

    /// Returns true if `address` belongs to the crawled site.
    ///
    /// http and https on the same host are both in scope.
    pub fn contains(&self, address: &NormalizedUrl) -> bool {
        if self.local {
            return address.is_file();
        }
        let url = address.as_url();
        !address.is_file()
            && url.host_str() == Some(self.host.as_str())
            && url.port() == self.port
    }

    /// Human-readable name of the site, used for the default report name
    pub fn name(&self) -> &str {
        if self.local {
            "local-files"
        } else {
            &self.host
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a newtype (struct NormalizedUrl(Url))?
//    - A plain Url could be raw or canonical, the compiler can't tell
//    - Wrapping it means functions that need a canonical key say so in
//      their signature, and the only constructor is normalize()
//
// 2. What does base.join(href) do?
//    - Resolves href the way a browser would
//    - "/docs" on https://a.com/x/y => https://a.com/docs
//    - "../z" on https://a.com/x/y  => https://a.com/z
//    - an absolute href replaces the base entirely
//
// 3. What is url.port()?
//    - The explicit port, or None when it's the scheme's default
//    - https://a.com:443/ has port() == None, so it matches https://a.com/
// -----------------------------------------------------------------------------
