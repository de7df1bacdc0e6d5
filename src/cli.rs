//! Command-line interface definitions.
//!
//! Flags map one-to-one onto a [`ScrapeRequest`] plus output and driver
//! settings. The WebDriver URL and the registry file can also come from the
//! environment.

use crate::scrapers::pagination::{PaginationPolicy, DEFAULT_MAX_PAGES};
use crate::scrapers::ScrapeRequest;
use chrono::NaiveDate;
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use std::path::PathBuf;

/// Search government tender portals and export the results.
///
/// # Examples
///
/// ```sh
/// # All portals, solar or irrigation tenders published this year
/// tender_scraper -k "Solar OR Irrigation" --start-date 2024-01-01
///
/// # Two portals, headless, no CAPTCHA pause
/// tender_scraper -s Odisha -s Maharashtra --headless --no-captcha-wait
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Keyword(s) to match; combine several with OR, e.g. "Solar OR Irrigation"
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Keep tenders published on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Keep tenders published on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Portal to scrape (repeatable); all portals when omitted
    #[arg(short = 's', long = "state")]
    pub states: Vec<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Do not pause for manual CAPTCHA solving after loading each portal
    #[arg(long)]
    pub no_captcha_wait: bool,

    /// WebDriver server the browser sessions are started on
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// YAML site registry replacing the built-in portals
    #[arg(short, long, env = "TENDER_SITES")]
    pub config: Option<PathBuf>,

    /// Directory the CSV, HTML and JSON files are written to
    #[arg(short, long, default_value = "./tenders")]
    pub output_dir: PathBuf,

    /// Upper bound on result pages read per portal (at least 1)
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_PAGES,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_pages: usize,

    /// Also write every extracted record before filtering
    #[arg(long)]
    pub export_unfiltered: bool,

    /// Print the registered portals and exit
    #[arg(long)]
    pub list_sites: bool,
}

impl Cli {
    pub fn request(&self) -> ScrapeRequest {
        ScrapeRequest {
            keyword: self.keyword.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            states: self.states.clone(),
            headless: self.headless,
            wait_for_captcha: !self.no_captcha_wait,
            pagination: PaginationPolicy::default().with_max_pages(self.max_pages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tender_scraper"]);
        let request = cli.request();
        assert!(request.keyword.is_none());
        assert!(request.states.is_empty());
        assert!(request.wait_for_captcha);
        assert!(!request.headless);
        assert_eq!(request.pagination.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(cli.output_dir, PathBuf::from("./tenders"));
    }

    #[test]
    fn test_cli_full_invocation() {
        let cli = Cli::parse_from([
            "tender_scraper",
            "-k",
            "Solar OR Irrigation",
            "--start-date",
            "2024-01-01",
            "--end-date",
            "2024-12-31",
            "-s",
            "Odisha",
            "--state",
            "Madhya Pradesh",
            "--headless",
            "--no-captcha-wait",
            "--max-pages",
            "5",
            "-o",
            "/tmp/tenders",
        ]);
        let request = cli.request();
        assert_eq!(request.keyword.as_deref(), Some("Solar OR Irrigation"));
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(request.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(request.states, vec!["Odisha", "Madhya Pradesh"]);
        assert!(request.headless);
        assert!(!request.wait_for_captcha);
        assert_eq!(request.pagination.max_pages, 5);
        assert_eq!(request.criteria().keywords, vec!["solar", "irrigation"]);
    }

    #[test]
    fn test_cli_rejects_zero_max_pages() {
        assert!(Cli::try_parse_from(["tender_scraper", "--max-pages", "0"]).is_err());
        let cli = Cli::try_parse_from(["tender_scraper", "--max-pages", "1"]).unwrap();
        assert_eq!(cli.request().pagination.max_pages, 1);
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        assert!(Cli::try_parse_from(["tender_scraper", "--start-date", "19/10/2024"]).is_err());
    }
}
