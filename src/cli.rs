// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The raw flags are converted into a typed CrawlConfig (src/config.rs) and
// ReportOptions (src/report/mod.rs) before anything else sees them.
// =============================================================================

use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{
    CrawlConfig, DepthLimit, FetchTimeout, DEFAULT_MAX_REDIRECTS, DEFAULT_USER_AGENT,
    DEFAULT_WORKERS,
};
use crate::crawl::DomainScope;
use crate::report::{ReportFormat, ReportOptions};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "site-auditor",
    version,
    about = "Crawl a single site and report the status of every reachable link",
    long_about = "site-auditor starts from one address, follows every same-domain link \
                  breadth-first and writes the status code of each page it reached to a \
                  report. Use it to find broken links, redirect chains and unreachable \
                  pages. Works on http(s):// sites and file:// directories."
)]
pub struct Cli {
    /// Seed address (e.g., https://example.com or file:///path/to/index.html)
    ///
    /// A leading "www." is ignored: www.example.com and example.com are the
    /// same site.
    pub start_url: String,

    /// Number of concurrent crawl workers
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    pub workers: usize,

    /// Maximum link depth from the seed (the seed is depth 0)
    ///
    /// Pages at the maximum depth are still checked, their links are not
    /// followed. Omit to crawl the whole site.
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Per-request timeout in seconds. Omit to wait as long as it takes.
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Report file (default: <domain>.csv or <domain>.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
    pub format: ReportFormat,

    /// Only write broken links (errors and 4xx/5xx statuses)
    #[arg(long)]
    pub broken_only: bool,

    /// Add the redirect chain of every address to the report
    #[arg(long)]
    pub redirects: bool,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Give up on an address after this many redirects
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,
}

impl Cli {
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            depth: DepthLimit::from(self.depth),
            workers: self.workers,
            timeout: FetchTimeout::from(self.timeout),
            user_agent: self.user_agent.clone(),
            max_redirects: self.max_redirects,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            format: self.format,
            broken_only: self.broken_only,
            redirects: self.redirects,
        }
    }

    /// Where the report goes: --output, or a name derived from the site
    pub fn report_path(&self, scope: &DomainScope) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => PathBuf::from(format!("{}.{}", scope.name(), self.format.extension())),
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does value_parser!(u16).range(1..) do?
//    - Parses the flag as a number and rejects 0 before our code runs
//    - .map(usize::from) converts it to the type the field wants
//
// 2. Option<usize> for --depth?
//    - clap makes Option fields optional flags automatically
//    - None means the flag was not given, which we read as "no limit"
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::normalize;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["site-auditor", "https://example.com"]).unwrap();
        let config = cli.crawl_config();

        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.depth, DepthLimit::Unbounded);
        assert_eq!(config.timeout, FetchTimeout::Never);
        assert_eq!(cli.format, ReportFormat::Csv);
        assert!(!cli.broken_only);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "site-auditor",
            "https://example.com",
            "-w",
            "3",
            "--depth",
            "2",
            "--timeout",
            "15",
            "--format",
            "json",
            "--broken-only",
            "--redirects",
        ])
        .unwrap();
        let config = cli.crawl_config();
        let options = cli.report_options();

        assert_eq!(config.workers, 3);
        assert_eq!(config.depth, DepthLimit::Limited(2));
        assert_eq!(config.timeout, FetchTimeout::After(Duration::from_secs(15)));
        assert_eq!(options.format, ReportFormat::Json);
        assert!(options.broken_only);
        assert!(options.redirects);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(Cli::try_parse_from(["site-auditor", "https://example.com", "-w", "0"]).is_err());
    }

    #[test]
    fn test_report_path_from_domain() {
        let cli = Cli::try_parse_from(["site-auditor", "https://www.example.com/"]).unwrap();
        let scope = DomainScope::from_seed(&normalize(&cli.start_url, None).unwrap());
        assert_eq!(cli.report_path(&scope), PathBuf::from("example.com.csv"));

        let cli = Cli::try_parse_from(["site-auditor", "x", "-o", "out.csv"]).unwrap();
        assert_eq!(cli.report_path(&scope), PathBuf::from("out.csv"));
    }
}
