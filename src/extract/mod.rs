// src/extract/mod.rs
// =============================================================================
// This module finds the links on a fetched page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Every <a href> is resolved against the page address and normalized.
// Links we can't use are dropped on the spot:
// - unparseable or non-http(s)/file hrefs (mailto:, javascript:, tel:...)
// - links to other sites
// Neither is an error for the crawl, they just never reach the frontier.
// =============================================================================

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::crawl::{normalize, DomainScope, NormalizedUrl};

// Returns the raw href of every anchor, in document order
//
// Example:
//   "<a href='/docs'>Docs</a><a>no href</a>"  =>  ["/docs"]
pub fn anchor_targets(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    // "a[href]" is a constant, known-good selector
    let selector = Selector::parse("a[href]").expect("valid anchor selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

// Extracts the in-scope links of a page
//
// Parameters:
//   html: the page body
//   base: the address the page was actually served from (after redirects)
//   scope: the site being crawled
//
// Returns: normalized addresses on the same site, possibly with duplicates
// (the visited registry filters those)
pub fn extract_links(html: &str, base: &Url, scope: &DomainScope) -> Vec<NormalizedUrl> {
    let mut links = Vec::new();

    for href in anchor_targets(html) {
        let address = match normalize(&href, Some(base)) {
            Ok(address) => address,
            Err(e) => {
                debug!("Skipping link on {}: {}", base, e);
                continue;
            }
        };

        if !scope.contains(&address) {
            continue;
        }

        links.push(address);
    }

    debug!("Extracted {} in-scope links from {}", links.len(), base);
    links
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is filter_map?
//    - Runs a closure returning Option on every item
//    - Keeps the Some values, drops the None ones
//    - attr("href") returns Option<&str>, so it fits perfectly
//
// 2. Why pass the final URL as base, not the normalized key?
//    - Normalization drops the trailing slash: /docs/ becomes /docs
//    - But "guide" on /docs/ means /docs/guide, while on /docs it means /guide
//    - The server's own spelling is the only correct base
// -----------------------------------------------------------------------------
