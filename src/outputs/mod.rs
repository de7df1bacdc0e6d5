//! Presentation of a search: files for download plus a terminal summary.
//!
//! # Submodules
//!
//! - [`csv`]: comma-separated export of a record sequence
//! - [`html`]: browsable table with the title column linked to the tender page
//! - [`json`]: search metadata, per-site reports and records
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── tenders.csv
//! ├── tenders_unfiltered.csv   # with --export-unfiltered
//! ├── tenders.html
//! └── tenders.json
//! ```
//!
//! All writers share one header layout: positional columns in numeric order,
//! then `Link`, then `State`. Records from different portals have different
//! widths, so the header is the union over the whole sequence.

use crate::models::{column_label, Record, SiteReport, SiteStatus, LINK_FIELD, STATE_FIELD};

pub mod csv;
pub mod html;
pub mod json;

pub const CSV_FILENAME: &str = "tenders.csv";
pub const UNFILTERED_CSV_FILENAME: &str = "tenders_unfiltered.csv";
pub const HTML_FILENAME: &str = "tenders.html";
pub const JSON_FILENAME: &str = "tenders.json";

/// Union header for `records`.
pub fn header(records: &[Record]) -> Vec<String> {
    let width = records.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    (0..width)
        .map(column_label)
        .chain([LINK_FIELD.to_string(), STATE_FIELD.to_string()])
        .collect()
}

/// One line per site for the terminal summary.
pub fn report_line(report: &SiteReport) -> String {
    match &report.status {
        SiteStatus::Completed { records, pages, stop } => format!(
            "{}: {} records from {} page(s) (stopped: {:?})",
            report.site, records, pages, stop
        ),
        SiteStatus::Failed { reason, records_kept } => format!(
            "{}: FAILED after {} records: {}",
            report.site, records_kept, reason
        ),
    }
}
