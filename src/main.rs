//! # Tender Scraper
//!
//! Collects publicly posted government tenders from regional eProcurement
//! portals, filters them by keyword and publication date, and writes the
//! result set as CSV, HTML and JSON.
//!
//! ## Usage
//!
//! ```sh
//! chromedriver --port=9515 &
//! tender_scraper -k "Solar OR Irrigation" --start-date 2024-01-01
//! ```
//!
//! ## Architecture
//!
//! 1. **Registry**: built-in portals, or a YAML file via `--config`
//! 2. **Scraping**: one browser session per portal, in registry order; after
//!    each portal loads, the operator solves its CAPTCHA and presses ENTER
//! 3. **Filtering**: keyword (`OR`-combined) and date range
//! 4. **Output**: files in the output directory and a per-portal summary

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod error;
mod filter;
mod gate;
mod models;
mod outputs;
mod registry;
mod scrapers;
mod session;
mod utils;

use cli::Cli;
use outputs::{CSV_FILENAME, HTML_FILENAME, JSON_FILENAME, UNFILTERED_CSV_FILENAME};
use registry::Registry;
use session::WebDriverLauncher;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let registry = Registry::load(args.config.as_deref()).await?;

    if args.list_sites {
        for site in registry.sites() {
            println!("{}\t{}", site.name, site.url);
        }
        return Ok(());
    }

    // Fail before opening any browser if results could not be saved.
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let request = args.request();
    let launcher = WebDriverLauncher::new(args.webdriver_url.clone());

    let mut gate = if request.wait_for_captcha {
        let (handle, gate) = gate::operator_gate();
        tokio::spawn(gate::confirm_from_stdin(handle));
        println!("After each portal opens: solve the CAPTCHA, click Search, then press ENTER here.");
        Some(gate)
    } else {
        None
    };

    let results = scrapers::search(&launcher, &registry, &request, gate.as_mut()).await;
    let criteria = request.criteria();

    for report in &results.reports {
        if report.is_failed() {
            warn!(site = %report.site, "Portal could not be scraped completely");
        }
        println!("{}", outputs::report_line(report));
    }

    if results.unfiltered.is_empty() {
        println!("No tenders found.");
    } else if results.matched.is_empty() {
        println!("No tenders matched your keywords/filters.");
    } else {
        println!("{} tenders found", results.matched.len());
    }

    let csv_path = args.output_dir.join(CSV_FILENAME);
    outputs::csv::write_csv(&results.matched, &csv_path)?;
    if args.export_unfiltered {
        outputs::csv::write_csv(&results.unfiltered, &args.output_dir.join(UNFILTERED_CSV_FILENAME))?;
    }
    outputs::html::write_html(&results.matched, &registry, &args.output_dir.join(HTML_FILENAME)).await?;
    outputs::json::write_results(&results, &criteria, &args.output_dir.join(JSON_FILENAME)).await?;
    println!("Results written to {}", args.output_dir.display());

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        sites = results.reports.len(),
        extracted = results.unfiltered.len(),
        matched = results.matched.len(),
        "Execution complete"
    );

    Ok(())
}
