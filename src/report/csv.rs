// src/report/csv.rs
// =============================================================================
// CSV report: one header row, then one row per visited address.
//
//   link,status_code[,redirect_chain]
//
// When only broken links are written the first column is called
// "broken_link" instead. Errors without an HTTP status are written as 0.
// =============================================================================

use std::io::Write;

use super::{ReportOptions, VisitRecord};

pub(super) fn write<W: Write>(
    records: &[&VisitRecord],
    output: W,
    options: &ReportOptions,
) -> Result<(), ::csv::Error> {
    let mut writer = ::csv::Writer::from_writer(output);

    let link_column = if options.broken_only {
        "broken_link"
    } else {
        "link"
    };
    let mut header = vec![link_column, "status_code"];
    if options.redirects {
        header.push("redirect_chain");
    }
    writer.write_record(&header)?;

    for record in records {
        let code = record.status.code().to_string();
        let mut row = vec![record.address.to_string(), code];
        if options.redirects {
            row.push(record.redirect_chain());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
