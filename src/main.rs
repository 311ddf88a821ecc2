// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging and parse command-line arguments
// 2. Build the crawler (a bad seed stops us right here)
// 3. Crawl the site, stopping early on Ctrl-C
// 4. Write the report and print a summary
// 5. Exit with proper code (0 = crawl completed, 2 = could not crawl)
//
// Broken links do NOT change the exit code: finding them is the job, not
// a failure.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - typed crawl settings
mod crawl; // src/crawl/ - normalization, frontier, worker pool
mod error; // src/error.rs - error types
mod extract; // src/extract/ - link extraction from HTML
mod fetch; // src/fetch/ - http(s) and file retrieval
mod report; // src/report/ - visit records and report writers

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use std::path::Path;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use crawl::Crawler;
use report::{CrawlSummary, VisitRecord};

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a multi-threaded tokio runtime, so crawl workers run in parallel
#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr, filtered by RUST_LOG (default: info)
// Example: RUST_LOG=site_auditor=debug site-auditor https://example.com
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let crawler = Crawler::new(&cli.start_url, cli.crawl_config())
        .with_context(|| format!("cannot crawl '{}'", cli.start_url))?;
    let report_path = cli.report_path(crawler.scope());

    println!("🔍 Crawling: {}", crawler.seed());

    // Ctrl-C closes the frontier: workers finish what they're doing and
    // we still write a (partial) report
    let shutdown = crawler.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.shutdown();
        }
    });

    let crawl = crawler.run().await?;

    let rows = report::write_report(&crawl.records, &report_path, &cli.report_options())
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    print_broken(&crawl.records);
    print_summary(&crawl.summary, rows, &report_path);

    Ok(0)
}

// Prints the broken addresses as a table, if there are any
fn print_broken(records: &[VisitRecord]) {
    let broken: Vec<&VisitRecord> = records.iter().filter(|r| r.is_broken()).collect();
    if broken.is_empty() {
        return;
    }

    println!();
    println!("{:<70} {:<10}", "BROKEN LINK", "STATUS");
    println!("{}", "=".repeat(81));

    for record in broken {
        let address = record.address.as_str();
        // Truncate long URLs so the table stays readable
        let address_display = if address.chars().count() > 67 {
            format!("{}...", address.chars().take(67).collect::<String>())
        } else {
            address.to_string()
        };
        println!("{:<70} {:<10}", address_display, record.status);
    }
}

fn print_summary(summary: &CrawlSummary, rows: usize, report_path: &Path) {
    println!();
    if summary.interrupted {
        println!("⚠️  Crawl interrupted, the report is partial");
    }
    println!("📊 Summary:");
    println!("   ✅ OK: {}", summary.ok);
    println!("   ❌ Broken: {}", summary.broken);
    println!("   ⚠️  Unreachable: {}", summary.errors);
    println!("   📋 Visited: {}", summary.visited);
    println!("   ⏱️  Took {:.2}s", summary.elapsed.as_secs_f64());
    println!("💾 {} row(s) written to {}", rows, report_path.display());
}
