// src/fetch/http.rs
// =============================================================================
// Fetches http:// and https:// addresses.
//
// reqwest can follow redirects on its own, but then it only tells us where
// we ended up, not how we got there. A link audit wants the whole chain
// (old URL -> 301 -> new URL -> 200), so automatic redirects are turned off
// and we follow Location headers ourselves.
//
// HTTP status codes:
// - 2xx: success
// - 3xx: redirect, follow the Location header
// - 4xx/5xx: recorded as-is, the page may still have links worth following
// =============================================================================

use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Client, Response};
use tracing::{debug, warn};
use url::Url;

use super::{FetchOutcome, FetchStatus, Hop};
use crate::config::CrawlConfig;

// Builds the shared HTTP client
//
// One client is reused for every request (connection pooling). Timeouts come
// from the config: FetchTimeout::Never means reqwest waits forever.
pub(super) fn build_client(config: &CrawlConfig) -> reqwest::Result<Client> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::none());

    if let Some(timeout) = config.timeout.as_duration() {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

pub(super) async fn fetch(client: &Client, address: &Url, max_redirects: usize) -> FetchOutcome {
    let mut current = address.clone();
    let mut redirects = Vec::new();

    loop {
        let response = match client.get(current.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                let message = describe_error(&e);
                warn!("Request to {} failed: {}", current, message);
                return FetchOutcome::failed(current, redirects, message);
            }
        };

        let status = response.status();

        if status.is_redirection() {
            // 304 and friends have no Location, treat them as final
            if let Some(next) = redirect_target(&response, &current) {
                redirects.push(Hop {
                    url: current.to_string(),
                    status: status.as_u16(),
                });

                if redirects.len() > max_redirects {
                    return FetchOutcome::failed(next, redirects, "too many redirects");
                }

                debug!("{} redirects to {}", current, next);
                current = next;
                continue;
            }
        }

        let body = if is_html(&response) {
            match response.text().await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Could not read body of {}: {}", current, describe_error(&e));
                    None
                }
            }
        } else {
            None
        };

        return FetchOutcome {
            status: FetchStatus::Code(status.as_u16()),
            final_url: current,
            redirects,
            body,
        };
    }
}

// Resolves the Location header against the URL that sent it
// (Location may be relative, e.g. "/new-page")
fn redirect_target(response: &Response, current: &Url) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}

// Turns a reqwest error into a short message for the report and logs
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Connection refused
fn describe_error(error: &reqwest::Error) -> String {
    let error_string = error.to_string();

    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "could not resolve hostname".to_string()
        } else {
            "connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Policy::none()?
//    - By default reqwest follows up to 10 redirects silently
//    - We want to see each 3xx response, so we turn that off and loop
//
// 2. What does the ? do inside redirect_target?
//    - In a function returning Option, `x?` returns None early when x is None
//    - Same idea as ? on Result, just for Option
//
// 3. Why only read the body for text/html?
//    - Images, PDFs and zip files have no links for us to follow
//    - Skipping them saves downloading megabytes we'd throw away
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn client() -> Client {
        build_client(&CrawlConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_ok_html_page_has_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body("<a href='/x'>x</a>");
            })
            .await;

        let url = Url::parse(&server.url("/")).unwrap();
        let outcome = fetch(&client(), &url, 10).await;

        assert_eq!(outcome.status, FetchStatus::Code(200));
        assert!(outcome.redirects.is_empty());
        assert_eq!(outcome.body.as_deref(), Some("<a href='/x'>x</a>"));
    }

    #[tokio::test]
    async fn test_non_html_has_no_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/logo.png");
                then.status(200)
                    .header("content-type", "image/png")
                    .body("PNG");
            })
            .await;

        let url = Url::parse(&server.url("/logo.png")).unwrap();
        let outcome = fetch(&client(), &url, 10).await;

        assert_eq!(outcome.status, FetchStatus::Code(200));
        assert!(outcome.body.is_none());
    }

    #[tokio::test]
    async fn test_redirect_chain_is_recorded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/old");
                then.status(301).header("location", "/middle");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/middle");
                then.status(302).header("location", "/new");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/new");
                then.status(200).header("content-type", "text/html").body("new");
            })
            .await;

        let url = Url::parse(&server.url("/old")).unwrap();
        let outcome = fetch(&client(), &url, 10).await;

        assert_eq!(outcome.status, FetchStatus::Code(200));
        assert_eq!(outcome.final_url.as_str(), server.url("/new"));
        assert_eq!(
            outcome.redirects,
            vec![
                Hop {
                    url: server.url("/old"),
                    status: 301
                },
                Hop {
                    url: server.url("/middle"),
                    status: 302
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_redirect_loop_gives_up() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/loop");
                then.status(302).header("location", "/loop");
            })
            .await;

        let url = Url::parse(&server.url("/loop")).unwrap();
        let outcome = fetch(&client(), &url, 3).await;

        assert_eq!(
            outcome.status,
            FetchStatus::Error("too many redirects".to_string())
        );
        assert_eq!(outcome.redirects.len(), 4);
    }

    #[tokio::test]
    async fn test_not_found_keeps_code() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).header("content-type", "text/html").body("nope");
            })
            .await;

        let url = Url::parse(&server.url("/missing")).unwrap();
        let outcome = fetch(&client(), &url, 10).await;

        assert_eq!(outcome.status, FetchStatus::Code(404));
        assert_eq!(outcome.body.as_deref(), Some("nope"));
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_secs(2));
            })
            .await;

        let config = CrawlConfig {
            timeout: crate::config::FetchTimeout::After(Duration::from_millis(100)),
            ..CrawlConfig::default()
        };
        let client = build_client(&config).unwrap();
        let url = Url::parse(&server.url("/slow")).unwrap();
        let outcome = fetch(&client, &url, 10).await;

        assert_eq!(
            outcome.status,
            FetchStatus::Error("request timed out".to_string())
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        // Port 1 is reserved and nothing listens there
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let outcome = fetch(&client(), &url, 10).await;
        assert!(matches!(outcome.status, FetchStatus::Error(_)));
    }
}
