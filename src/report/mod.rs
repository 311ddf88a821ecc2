// src/report/mod.rs
// =============================================================================
// Crawl results and what we do with them.
//
// - VisitRecord: the result of fetching one unique address
// - ResultSink: the shared list workers append records to
// - csv / json: writers for the final report file
// - CrawlSummary: the counts printed at the end of a run
// =============================================================================

mod csv;
mod json;

use clap::ValueEnum;
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::crawl::{FrontierEntry, NormalizedUrl};
use crate::error::ReportError;
use crate::fetch::{FetchOutcome, FetchStatus, Hop};

/// The result of visiting one address. Never changes once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitRecord {
    /// The address as discovered (the status below belongs to it, even
    /// when it only got there through redirects)
    pub address: NormalizedUrl,
    pub depth: usize,
    pub status: FetchStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub redirects: Vec<Hop>,
    pub final_address: String,
}

impl VisitRecord {
    pub fn new(entry: &FrontierEntry, outcome: &FetchOutcome) -> Self {
        Self {
            address: entry.address.clone(),
            depth: entry.depth,
            status: outcome.status.clone(),
            redirects: outcome.redirects.clone(),
            final_address: outcome.final_url.to_string(),
        }
    }

    pub fn is_broken(&self) -> bool {
        self.status.is_broken()
    }

    /// Renders the redirect chain as `[301]http://a/old -> [200]http://a/new`.
    ///
    /// Empty when the address answered directly.
    pub fn redirect_chain(&self) -> String {
        if self.redirects.is_empty() {
            return String::new();
        }

        let mut parts: Vec<String> = self
            .redirects
            .iter()
            .map(|hop| format!("[{}]{}", hop.status, hop.url))
            .collect();
        parts.push(format!("[{}]{}", self.status, self.final_address));
        parts.join(" -> ")
    }
}

/// Thread-safe collector of visit records.
///
/// The lock is held only for the push itself.
#[derive(Debug, Default)]
pub struct ResultSink {
    records: Mutex<Vec<VisitRecord>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: VisitRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Takes every record collected so far, sorted by address so reports
    /// are stable from run to run.
    pub fn finish(&self) -> Vec<VisitRecord> {
        let mut records =
            std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner));
        records.sort_by(|a, b| a.address.cmp(&b.address));
        records
    }
}

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// What goes into the report file
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub format: ReportFormat,
    /// Only rows whose status is broken (error marker or 4xx/5xx)
    pub broken_only: bool,
    /// Add the rendered redirect chain column
    pub redirects: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::Csv,
            broken_only: false,
            redirects: false,
        }
    }
}

// Writes the report file
//
// Returns: the number of rows written (not counting the CSV header)
pub fn write_report(
    records: &[VisitRecord],
    path: &Path,
    options: &ReportOptions,
) -> Result<usize, ReportError> {
    let rows: Vec<&VisitRecord> = records
        .iter()
        .filter(|record| !options.broken_only || record.is_broken())
        .collect();

    let file = std::fs::File::create(path)?;
    match options.format {
        ReportFormat::Csv => csv::write(&rows, file, options)?,
        ReportFormat::Json => json::write(&rows, file)?,
    }

    tracing::info!("Report with {} row(s) saved to {}", rows.len(), path.display());
    Ok(rows.len())
}

/// Counts for the end-of-run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub visited: usize,
    pub ok: usize,
    /// 4xx/5xx responses
    pub broken: usize,
    /// No response at all
    pub errors: usize,
    pub elapsed: Duration,
    /// The crawl was stopped early (Ctrl-C)
    pub interrupted: bool,
}

impl CrawlSummary {
    pub fn from_records(records: &[VisitRecord], elapsed: Duration, interrupted: bool) -> Self {
        let errors = records
            .iter()
            .filter(|r| matches!(r.status, FetchStatus::Error(_)))
            .count();
        let broken = records.iter().filter(|r| r.is_broken()).count() - errors;

        Self {
            visited: records.len(),
            ok: records.len() - broken - errors,
            broken,
            errors,
            elapsed,
            interrupted,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::crawl::normalize;

    pub(crate) fn record(address: &str, status: FetchStatus) -> VisitRecord {
        VisitRecord {
            address: normalize(address, None).unwrap(),
            depth: 0,
            status,
            redirects: Vec::new(),
            final_address: address.to_string(),
        }
    }

    #[test]
    fn test_redirect_chain_rendering() {
        let mut rec = record("http://a.com/old", FetchStatus::Code(200));
        assert_eq!(rec.redirect_chain(), "");

        rec.redirects.push(Hop {
            url: "http://a.com/old".to_string(),
            status: 301,
        });
        rec.final_address = "http://a.com/new".to_string();
        assert_eq!(
            rec.redirect_chain(),
            "[301]http://a.com/old -> [200]http://a.com/new"
        );
    }

    #[test]
    fn test_sink_finish_sorts_and_drains() {
        let sink = ResultSink::new();
        sink.record(record("http://a.com/b", FetchStatus::Code(200)));
        sink.record(record("http://a.com/a", FetchStatus::Code(404)));

        let records = sink.finish();
        let addresses: Vec<_> = records.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["http://a.com/a", "http://a.com/b"]);
        assert!(sink.finish().is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            record("http://a.com/", FetchStatus::Code(200)),
            record("http://a.com/moved", FetchStatus::Code(301)),
            record("http://a.com/404", FetchStatus::Code(404)),
            record("http://a.com/500", FetchStatus::Code(500)),
            record("http://a.com/down", FetchStatus::Error("refused".to_string())),
        ];
        let summary = CrawlSummary::from_records(&records, Duration::from_secs(1), false);

        assert_eq!(summary.visited, 5);
        assert_eq!(summary.ok, 2);
        assert_eq!(summary.broken, 2);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn test_write_report_broken_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let records = vec![
            record("http://a.com/", FetchStatus::Code(200)),
            record("http://a.com/404", FetchStatus::Code(404)),
        ];
        let options = ReportOptions {
            broken_only: true,
            ..ReportOptions::default()
        };

        let rows = write_report(&records, &path, &options).unwrap();

        assert_eq!(rows, 1);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "broken_link,status_code\nhttp://a.com/404,404\n");
    }
}
