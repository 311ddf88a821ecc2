// src/report/json.rs
// Pretty-printed JSON array of visit records.

use std::io::Write;

use super::VisitRecord;
use crate::error::ReportError;

pub(super) fn write<W: Write>(records: &[&VisitRecord], mut output: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut output, records)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
