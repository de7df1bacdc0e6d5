//! HTML table of the result set.
//!
//! Same columns as the CSV plus a `Title` column: the text of the site's title
//! cell, wrapped in a link to the tender page when the row had one. The page is
//! rendered from `templates/tenders.html`, which escapes every value.

use super::header;
use crate::models::Record;
use crate::registry::Registry;
use askama::Template;
use chrono::Local;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// One `<tr>` of the results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenderRow {
    /// Cell values in header order, padded with empty strings.
    pub cells: Vec<String>,
    pub title: String,
    /// Empty when the record has no link.
    pub link: String,
}

impl TenderRow {
    pub fn new(record: &Record, header: &[String], title_column: usize) -> Self {
        Self {
            cells: header
                .iter()
                .map(|label| record.get(label).unwrap_or_default().to_string())
                .collect(),
            title: record.column(title_column).unwrap_or_default().to_string(),
            link: record.link.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "tenders.html")]
pub struct TendersPage {
    pub header: Vec<String>,
    pub rows: Vec<TenderRow>,
    pub generated_at: String,
}

impl TendersPage {
    /// Build the page for `records`, picking each row's title column from the
    /// registry entry of its site.
    pub fn new(records: &[Record], registry: &Registry) -> Self {
        let header = header(records);
        let rows = records
            .iter()
            .map(|r| TenderRow::new(r, &header, registry.roles_for(&r.state).title))
            .collect();
        Self {
            header,
            rows,
            generated_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Render the results page and write it to `path`.
///
/// # Errors
///
/// Returns an error if the template fails to render or the file cannot be
/// written.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_html(records: &[Record], registry: &Registry, path: &Path) -> Result<(), Box<dyn Error>> {
    let html = TendersPage::new(records, registry).render()?;
    tokio::fs::write(path, html).await?;
    info!("Wrote HTML table");
    Ok(())
}
