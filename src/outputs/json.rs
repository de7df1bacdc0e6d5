//! JSON output of a search.
//!
//! One document holding when and how the search ran, what happened on each
//! portal, and the matched records:
//!
//! ```text
//! {
//!   "generated_at": "2024-10-19T10:00:00+05:30",
//!   "criteria": { "keywords": ["solar"], "start_date": "2024-01-01", "end_date": null },
//!   "sites": [ { "site": "Odisha", "status": "completed", ... } ],
//!   "total_extracted": 40,
//!   "records": [ { "Col1": "1", ..., "Link": "...", "State": "Odisha" } ]
//! }
//! ```

use crate::filter::FilterCriteria;
use crate::scrapers::SearchResults;
use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
struct CriteriaView<'a> {
    keywords: &'a [String],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct SearchDocument<'a> {
    generated_at: String,
    criteria: CriteriaView<'a>,
    sites: &'a [crate::models::SiteReport],
    total_extracted: usize,
    records: &'a [crate::models::Record],
}

/// Serialize a search to pretty JSON.
pub fn to_json(results: &SearchResults, criteria: &FilterCriteria) -> Result<String, serde_json::Error> {
    let document = SearchDocument {
        generated_at: chrono::Local::now().to_rfc3339(),
        criteria: CriteriaView {
            keywords: &criteria.keywords,
            start_date: criteria.start_date,
            end_date: criteria.end_date,
        },
        sites: &results.reports,
        total_extracted: results.unfiltered.len(),
        records: &results.matched,
    };
    serde_json::to_string_pretty(&document)
}

/// Write the search document to `path`, creating its directory if needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_results(
    results: &SearchResults,
    criteria: &FilterCriteria,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let json = to_json(results, criteria)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(records = results.matched.len(), "Wrote JSON results");
    Ok(())
}
