//! In-memory sessions for tests: pages are static HTML, "next" jumps between them.

use super::{FramePath, PageSession, SessionLauncher};
use crate::error::ScrapeError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    pub main: String,
    pub frames: Vec<String>,
    /// Index of the page the "next" control leads to, if the page has one.
    pub next: Option<usize>,
    /// Clicking "next" on this page fails.
    pub next_fails: bool,
    /// Reads of the main document that return an empty body before `main`
    /// shows up, as on a page that is still rendering.
    pub blank_reads: usize,
}

impl FixturePage {
    pub fn new(main: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            ..Self::default()
        }
    }

    pub fn with_frame(mut self, html: impl Into<String>) -> Self {
        self.frames.push(html.into());
        self
    }

    pub fn with_next(mut self, next: usize) -> Self {
        self.next = Some(next);
        self
    }

    pub fn with_blank_reads(mut self, reads: usize) -> Self {
        self.blank_reads = reads;
        self
    }
}

#[derive(Debug, Default)]
pub struct FixtureLauncher {
    sites: HashMap<String, Vec<FixturePage>>,
    fail_launch: bool,
    pub launches: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    /// Frame listings requested across all sessions.
    pub frame_queries: Arc<AtomicUsize>,
}

impl FixtureLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(mut self, url: &str, pages: Vec<FixturePage>) -> Self {
        self.sites.insert(url.to_string(), pages);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }
}

impl SessionLauncher for FixtureLauncher {
    type Session = FixtureSession;

    async fn launch(&self, _headless: bool) -> Result<Self::Session, ScrapeError> {
        if self.fail_launch {
            return Err(ScrapeError::Launch("no browser in fixture".to_string()));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FixtureSession {
            sites: self.sites.clone(),
            url: None,
            current: 0,
            reads: 0,
            closes: Arc::clone(&self.closes),
            frame_queries: Arc::clone(&self.frame_queries),
        })
    }
}

pub struct FixtureSession {
    sites: HashMap<String, Vec<FixturePage>>,
    url: Option<String>,
    current: usize,
    /// Main-document reads of the current page.
    reads: usize,
    closes: Arc<AtomicUsize>,
    frame_queries: Arc<AtomicUsize>,
}

impl FixtureSession {
    fn page(&self) -> Result<&FixturePage, ScrapeError> {
        self.url
            .as_ref()
            .and_then(|url| self.sites.get(url))
            .and_then(|pages| pages.get(self.current))
            .ok_or_else(|| ScrapeError::Navigation {
                url: self.url.clone().unwrap_or_default(),
                reason: "no fixture page".to_string(),
            })
    }

    fn document(&self, frame: &FramePath) -> Result<&str, ScrapeError> {
        let page = self.page()?;
        match frame.indices() {
            [] => Ok(page.main.as_str()),
            [i] => page
                .frames
                .get(*i as usize)
                .map(String::as_str)
                .ok_or_else(|| ScrapeError::Navigation {
                    url: self.url.clone().unwrap_or_default(),
                    reason: format!("no {frame}"),
                }),
            _ => Err(ScrapeError::Navigation {
                url: self.url.clone().unwrap_or_default(),
                reason: "nested frames are not modelled".to_string(),
            }),
        }
    }
}

impl PageSession for FixtureSession {
    async fn goto(&mut self, url: &str) -> Result<(), ScrapeError> {
        if !self.sites.contains_key(url) {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "unreachable".to_string(),
            });
        }
        self.url = Some(url.to_string());
        self.current = 0;
        self.reads = 0;
        Ok(())
    }

    async fn frame_count(&mut self, frame: &FramePath) -> Result<usize, ScrapeError> {
        self.frame_queries.fetch_add(1, Ordering::SeqCst);
        if frame.is_root() {
            Ok(self.page()?.frames.len())
        } else {
            Ok(0)
        }
    }

    async fn page_source(&mut self, frame: &FramePath) -> Result<String, ScrapeError> {
        if frame.is_root() {
            let blank = self.reads < self.page()?.blank_reads;
            self.reads += 1;
            if blank {
                return Ok("<html><body></body></html>".to_string());
            }
        }
        self.document(frame).map(str::to_string)
    }

    async fn base_url(&mut self, _frame: &FramePath) -> Result<Url, ScrapeError> {
        Ok(Url::parse(self.url.as_deref().unwrap_or("about:blank"))?)
    }

    async fn click_next(&mut self, _frame: &FramePath) -> Result<bool, ScrapeError> {
        let page = self.page()?;
        if page.next_fails {
            return Err(ScrapeError::Navigation {
                url: self.url.clone().unwrap_or_default(),
                reason: "stale element".to_string(),
            });
        }
        let next = page.next;
        match next {
            Some(next) => {
                self.current = next;
                self.reads = 0;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn close(self) -> Result<(), ScrapeError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A results table with a header row and one `<tr>` per entry of `rows`.
///
/// Each row is a list of cell HTML snippets.
pub fn table_html(rows: &[Vec<&str>]) -> String {
    let mut html = String::from("<html><body><table><tr><th>Sl</th><th>Title</th></tr>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str("<td>");
            html.push_str(cell);
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</table></body></html>");
    html
}
