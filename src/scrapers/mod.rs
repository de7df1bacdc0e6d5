//! Scraping tender tables from the registered portals.
//!
//! Sites are scraped one at a time, in registry order. Each site gets its own
//! browser session:
//!
//! 1. **Launch**: start a session through the [`SessionLauncher`]
//! 2. **Navigate**: open the site's search page
//! 3. **Gate**: optionally wait for the operator to solve the CAPTCHA
//! 4. **Walk**: [`pagination::walk_pages`] extracts every result page
//! 5. **Close**: the session is closed whatever happened in 2–4
//!
//! Any error ends that site only. Its records so far are kept and the failure
//! is recorded in a [`SiteReport`].

use crate::error::ScrapeError;
use crate::filter::FilterCriteria;
use crate::gate::OperatorGate;
use crate::models::{Record, Site, SiteReport, SiteStatus};
use crate::registry::Registry;
use crate::session::{PageSession, SessionLauncher};
use chrono::NaiveDate;
use pagination::{PaginationPolicy, WalkSummary};
use tracing::{error, info, instrument, warn};

pub mod pagination;
pub mod table;

/// One search invocation.
#[derive(Debug, Clone, Default)]
pub struct ScrapeRequest {
    /// Keyword text, several keywords joined with `OR`.
    pub keyword: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Site names to scrape; empty means all.
    pub states: Vec<String>,
    pub headless: bool,
    /// Pause for the operator after each site loads.
    pub wait_for_captcha: bool,
    pub pagination: PaginationPolicy,
}

impl ScrapeRequest {
    /// Filter criteria built from the keyword text and date bounds.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new(self.keyword.as_deref(), self.start_date, self.end_date)
    }
}

/// Records and per-site reports of one scrape, before filtering.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub records: Vec<Record>,
    pub reports: Vec<SiteReport>,
}

/// Result of a full search: scrape followed by the filter stage.
#[derive(Debug)]
pub struct SearchResults {
    /// Everything that was extracted.
    pub unfiltered: Vec<Record>,
    /// The result set after keyword and date filtering.
    pub matched: Vec<Record>,
    pub reports: Vec<SiteReport>,
}

/// Scrape the requested sites and apply the request's filters.
///
/// # Arguments
///
/// * `launcher` - Starts one browser session per site
/// * `registry` - Portals to choose from, and their column roles
/// * `request` - Sites, filters, pagination limits and browser options
/// * `gate` - Operator gate used when `request.wait_for_captcha` is set
///
/// # Returns
///
/// Both the full and the filtered record sets, plus one [`SiteReport`] per
/// selected site. Site failures never abort the search; they only show up in
/// the reports.
pub async fn search<L: SessionLauncher>(
    launcher: &L,
    registry: &Registry,
    request: &ScrapeRequest,
    gate: Option<&mut OperatorGate>,
) -> SearchResults {
    let outcome = scrape_all_sites(launcher, registry, request, gate).await;
    let matched = request.criteria().apply(&outcome.records, registry);
    info!(
        extracted = outcome.records.len(),
        matched = matched.len(),
        "Search complete"
    );
    SearchResults {
        unfiltered: outcome.records,
        matched,
        reports: outcome.reports,
    }
}

/// Scrape every selected site in registry order and concatenate the records.
///
/// `gate` is only consulted when `request.wait_for_captcha` is set.
///
/// # Returns
///
/// The records of all sites in scrape order, including those a failing site
/// produced before its error, and one [`SiteReport`] per site.
#[instrument(level = "info", skip_all, fields(states = ?request.states))]
pub async fn scrape_all_sites<L: SessionLauncher>(
    launcher: &L,
    registry: &Registry,
    request: &ScrapeRequest,
    mut gate: Option<&mut OperatorGate>,
) -> ScrapeOutcome {
    let mut outcome = ScrapeOutcome::default();
    let sites = registry.select(&request.states);
    if sites.is_empty() {
        warn!("No sites selected");
    }

    for site in sites {
        let gate = if request.wait_for_captcha {
            gate.as_deref_mut()
        } else {
            None
        };
        let mut records = Vec::new();
        let status = match scrape_site(launcher, site, request, gate, &mut records).await {
            Ok(summary) => SiteStatus::Completed {
                records: records.len(),
                pages: summary.pages,
                stop: summary.stop,
            },
            Err(e) => {
                error!(site = %site.name, error = %e, kept = records.len(), "Site scrape failed");
                SiteStatus::Failed {
                    reason: e.to_string(),
                    records_kept: records.len(),
                }
            }
        };
        outcome.records.append(&mut records);
        outcome.reports.push(SiteReport {
            site: site.name.clone(),
            status,
        });
    }

    outcome
}

/// Scrape one site into `sink`.
///
/// The browser session is closed before returning on every path after a
/// successful launch. A failing close is logged and does not change the result.
#[instrument(level = "info", skip_all, fields(site = %site.name))]
pub async fn scrape_site<L: SessionLauncher>(
    launcher: &L,
    site: &Site,
    request: &ScrapeRequest,
    gate: Option<&mut OperatorGate>,
    sink: &mut Vec<Record>,
) -> Result<WalkSummary, ScrapeError> {
    let table = table::table_selector(&site.table_selector)?;
    let mut session = launcher.launch(request.headless).await?;

    let result = drive_site(&mut session, site, &table, &request.pagination, gate, sink).await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "Failed to close browser session");
    }
    if let Ok(summary) = &result {
        info!(records = sink.len(), pages = summary.pages, "Site scraped");
    }
    result
}

async fn drive_site<S: PageSession>(
    session: &mut S,
    site: &Site,
    table: &scraper::Selector,
    policy: &PaginationPolicy,
    gate: Option<&mut OperatorGate>,
    sink: &mut Vec<Record>,
) -> Result<WalkSummary, ScrapeError> {
    session.goto(&site.url).await?;
    info!(url = %site.url, "Opened search page");
    if let Some(gate) = gate {
        gate.wait_for_operator(site).await?;
    }
    pagination::walk_pages(session, table, &site.name, policy, sink).await
}
