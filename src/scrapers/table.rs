//! Locating the results table and turning its rows into [`Record`]s.
//!
//! Both steps work on HTML snapshots of a single frame, read through
//! [`PageSession::page_source`]. The DOM is never modified.

use crate::error::ScrapeError;
use crate::models::Record;
use crate::session::{FramePath, PageSession};
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("static selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("static selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("static selector"));

/// Parse a site's table selector.
pub fn table_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Decide which document holds the results table.
///
/// Top-level frames are checked in order and the first one containing any
/// element matching `table` wins. Falls back to the main document.
#[instrument(level = "debug", skip_all)]
pub async fn locate_table<S: PageSession>(
    session: &mut S,
    table: &Selector,
) -> Result<FramePath, ScrapeError> {
    let root = FramePath::root();
    let frames = session.frame_count(&root).await?;
    for index in 0..frames {
        let Ok(index) = u16::try_from(index) else {
            break;
        };
        let frame = root.child(index);
        let html = session.page_source(&frame).await?;
        if Html::parse_document(&html).select(table).next().is_some() {
            debug!(%frame, "Results table found inside frame");
            return Ok(frame);
        }
    }
    Ok(root)
}

/// Extract the data rows of the first table with more than one row.
///
/// The first row of that table is the header and is skipped. Returns `None`
/// when no table qualifies.
pub fn extract_rows(html: &str, table: &Selector, base: &Url, state: &str) -> Option<Vec<Record>> {
    let document = Html::parse_document(html);
    let rows: Vec<ElementRef> = document
        .select(table)
        .map(|t| t.select(&ROW).collect::<Vec<_>>())
        .find(|rows| rows.len() > 1)?;

    Some(
        rows.into_iter()
            .skip(1)
            .filter_map(|row| extract_record(row, base, state))
            .collect(),
    )
}

/// Convert one `<tr>` into a record, or `None` for rows without cells.
pub fn extract_record(row: ElementRef, base: &Url, state: &str) -> Option<Record> {
    let cells: Vec<String> = row.select(&CELL).map(cell_text).collect();
    if cells.is_empty() {
        return None;
    }

    let link = row
        .select(&ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| resolve_link(base, href))
        .unwrap_or_default();

    Some(Record {
        cells,
        link,
        state: state.to_string(),
    })
}

fn cell_text(cell: ElementRef) -> String {
    collapse_whitespace(&cell.text().collect::<Vec<_>>().join(" "))
}

/// Absolute form of `href`; the raw value when it cannot be resolved.
fn resolve_link(base: &Url, href: &str) -> String {
    let href = href.trim();
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
