//! The pagination walker.
//!
//! ```text
//! FETCH_ROWS → EXTRACT → FIND_NEXT → (CLICK_NEXT → FETCH_ROWS) | TERMINATE
//! ```
//!
//! Every page is a self-contained step: the table is located again, its rows
//! extracted, then the "next" control is clicked in the frame the rows came
//! from. The walk ends when a page has
//! no rows (after one retry), there is no next control, clicking it fails, the
//! page cap is hit, or "next" produced the same page again.

use super::table::{extract_rows, locate_table};
use crate::error::ScrapeError;
use crate::models::{Record, StopReason};
use crate::session::{FramePath, PageSession};
use crate::utils::truncate_for_log;
use scraper::Selector;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Default upper bound on pages read from one site.
pub const DEFAULT_MAX_PAGES: usize = 100;

/// Limits and delays of one walk.
#[derive(Debug, Clone)]
pub struct PaginationPolicy {
    pub max_pages: usize,
    /// Wait after clicking "next" for the new page to render.
    pub settle_delay: Duration,
    /// Wait before the single retry when a page has no rows.
    pub empty_retry_delay: Duration,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            settle_delay: Duration::from_secs(2),
            empty_retry_delay: Duration::from_secs(2),
        }
    }
}

impl PaginationPolicy {
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// What a finished walk looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    pub pages: usize,
    pub stop: StopReason,
}

/// Walk all result pages of the loaded site, appending records to `sink`.
///
/// A page without rows is read a second time after
/// [`PaginationPolicy::empty_retry_delay`] before the walk gives up on it.
///
/// # Arguments
///
/// * `session` - Session with the site's first result page loaded
/// * `table` - Selector matching the site's results table
/// * `state` - Site name stamped on every record
/// * `policy` - Page cap and delays
/// * `sink` - Receives the records of every finished page
///
/// # Returns
///
/// The number of pages read and why the walk stopped.
///
/// # Errors
///
/// Returns the session error if reading a page fails. Records of pages read
/// before the failure stay in `sink`. A failing "next" click is not an error;
/// it ends the walk with [`StopReason::NextFailed`].
#[instrument(level = "info", skip_all, fields(%state))]
pub async fn walk_pages<S: PageSession>(
    session: &mut S,
    table: &Selector,
    state: &str,
    policy: &PaginationPolicy,
    sink: &mut Vec<Record>,
) -> Result<WalkSummary, ScrapeError> {
    let mut pages = 0;
    let mut previous: Option<Vec<Record>> = None;

    let stop = loop {
        if pages >= policy.max_pages {
            warn!(max_pages = policy.max_pages, "Page cap reached; stopping");
            break StopReason::PageCap;
        }

        let (frame, rows) = match fetch_rows(session, table, state).await? {
            (frame, Some(rows)) => (frame, rows),
            (_, None) => {
                debug!(page = pages + 1, "No rows; retrying once");
                sleep(policy.empty_retry_delay).await;
                match fetch_rows(session, table, state).await? {
                    (frame, Some(rows)) => (frame, rows),
                    (_, None) => break StopReason::NoRows,
                }
            }
        };

        if previous.as_ref() == Some(&rows) {
            warn!(page = pages + 1, "Next page is identical to the previous one; stopping");
            break StopReason::RepeatedPage;
        }

        pages += 1;
        debug!(
            page = pages,
            rows = rows.len(),
            first = %rows.first().map(|r| truncate_for_log(&r.cells.join(" | "), 120)).unwrap_or_default(),
            "Extracted page"
        );
        sink.extend(rows.iter().cloned());
        previous = Some(rows);

        match session.click_next(&frame).await {
            Ok(true) => sleep(policy.settle_delay).await,
            Ok(false) => break StopReason::NoNextControl,
            Err(e) => {
                debug!(error = %e, "Next-page click failed; treating as last page");
                break StopReason::NextFailed;
            }
        }
    };

    info!(pages, ?stop, "Pagination finished");
    Ok(WalkSummary { pages, stop })
}

/// One FETCH_ROWS + EXTRACT step.
///
/// Returns the frame holding the table together with its rows, which are
/// `None` when the page has no table with data rows. A table whose rows are
/// all cell-less still counts as a page.
async fn fetch_rows<S: PageSession>(
    session: &mut S,
    table: &Selector,
    state: &str,
) -> Result<(FramePath, Option<Vec<Record>>), ScrapeError> {
    let frame = locate_table(session, table).await?;
    let html = session.page_source(&frame).await?;
    let base = session.base_url(&frame).await?;
    let rows = extract_rows(&html, table, &base, state);
    Ok((frame, rows))
}
