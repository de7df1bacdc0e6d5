//! Error taxonomy for a single site scrape.
//!
//! Every variant is fatal to the site it occurred on and nothing else: the
//! multi-site loop in [`crate::scrapers`] catches it, logs it, closes the
//! browser session and moves on to the next portal.

use thirtyfour::error::WebDriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The browser session could not be started.
    #[error("failed to launch browser session: {0}")]
    Launch(String),

    /// A WebDriver command failed after the session was up.
    #[error("webdriver command failed: {0}")]
    Driver(#[from] WebDriverError),

    /// The portal page could not be loaded.
    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// The operator side of the CAPTCHA gate went away before confirming.
    #[error("operator gate closed while waiting on {site}")]
    GateClosed { site: String },

    #[error("invalid table selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}
