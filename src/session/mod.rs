//! Browser sessions.
//!
//! The scraper never talks to a browser directly. It goes through two traits:
//!
//! - [`SessionLauncher`]: starts one session per site
//! - [`PageSession`]: the handful of page operations the pipeline needs
//!
//! [`webdriver`] implements both on top of a WebDriver server. Frame context is
//! never implicit: every query takes the [`FramePath`] it should run in.

use crate::error::ScrapeError;
use itertools::Itertools;
use url::Url;

pub mod webdriver;

#[cfg(test)]
pub mod fixture;

pub use webdriver::WebDriverLauncher;

/// Chain of frame indices from the top-level document.
///
/// The empty path is the main document; `[2]` is the third frame of the main
/// document, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FramePath(Vec<u16>);

impl FramePath {
    /// The main document.
    pub fn root() -> Self {
        Self::default()
    }

    /// The `index`-th frame inside the document at `self`.
    pub fn child(&self, index: u16) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn indices(&self) -> &[u16] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for FramePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            return f.write_str("main document");
        }
        write!(f, "frame {}", self.0.iter().join("/"))
    }
}

/// A live, navigable browser session.
pub trait PageSession {
    /// Load `url` in the top-level document.
    async fn goto(&mut self, url: &str) -> Result<(), ScrapeError>;

    /// Number of child frames of the document at `frame`.
    async fn frame_count(&mut self, frame: &FramePath) -> Result<usize, ScrapeError>;

    /// Current HTML of the document at `frame`.
    async fn page_source(&mut self, frame: &FramePath) -> Result<String, ScrapeError>;

    /// URL relative links in the document at `frame` resolve against.
    async fn base_url(&mut self, frame: &FramePath) -> Result<Url, ScrapeError>;

    /// Find and activate the "next page" control in the document at `frame`.
    ///
    /// `Ok(false)` means there is no such control.
    async fn click_next(&mut self, frame: &FramePath) -> Result<bool, ScrapeError>;

    /// Tear the session down. Consumes the session so it cannot be reused.
    async fn close(self) -> Result<(), ScrapeError>;
}

/// Starts browser sessions.
pub trait SessionLauncher {
    type Session: PageSession;

    /// Start a fresh session, without a visible window when `headless`.
    async fn launch(&self, headless: bool) -> Result<Self::Session, ScrapeError>;
}
