//! [`PageSession`] backed by a WebDriver server (`chromedriver` or Selenium).

use super::{FramePath, PageSession, SessionLauncher};
use crate::error::ScrapeError;
use std::time::Duration;
use thirtyfour::error::WebDriverResult;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;
use tokio::time::sleep;
use tracing::{debug, info, instrument};
use url::Url;

/// Anchors whose text mentions "Next" or whose class mentions "next".
const NEXT_CONTROL_XPATH: &str = "//a[contains(text(),'Next') or contains(@class,'next')]";

/// Pause between scrolling the next control into view and clicking it.
const SCROLL_PAUSE: Duration = Duration::from_secs(1);

/// Launches Chrome sessions through a running WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    server_url: String,
}

impl WebDriverLauncher {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
        }
    }
}

impl SessionLauncher for WebDriverLauncher {
    type Session = WebDriverSession;

    #[instrument(level = "info", skip(self), fields(server = %self.server_url))]
    async fn launch(&self, headless: bool) -> Result<Self::Session, ScrapeError> {
        let mut caps = DesiredCapabilities::chrome();
        if headless {
            caps.add_arg("--headless=new")
                .map_err(|e| ScrapeError::Launch(e.to_string()))?;
        }
        caps.add_arg("--start-maximized")
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        let driver = WebDriver::new(self.server_url.as_str(), caps)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;
        info!(headless, "Browser session started");
        Ok(WebDriverSession { driver })
    }
}

pub struct WebDriverSession {
    driver: WebDriver,
}

impl WebDriverSession {
    /// Point the driver at `frame`, starting from the top-level document.
    async fn enter(&self, frame: &FramePath) -> WebDriverResult<()> {
        self.driver.enter_default_frame().await?;
        for &index in frame.indices() {
            self.driver.enter_frame(index).await?;
        }
        Ok(())
    }
}

impl PageSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.driver
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn frame_count(&mut self, frame: &FramePath) -> Result<usize, ScrapeError> {
        self.enter(frame).await?;
        Ok(self.driver.find_all(By::Css("iframe, frame")).await?.len())
    }

    async fn page_source(&mut self, frame: &FramePath) -> Result<String, ScrapeError> {
        self.enter(frame).await?;
        Ok(self.driver.source().await?)
    }

    async fn base_url(&mut self, frame: &FramePath) -> Result<Url, ScrapeError> {
        self.enter(frame).await?;
        let ret = self
            .driver
            .execute("return document.baseURI;", Vec::new())
            .await?;
        match ret.json().as_str() {
            Some(base) => Ok(Url::parse(base)?),
            None => Ok(self.driver.current_url().await?),
        }
    }

    async fn click_next(&mut self, frame: &FramePath) -> Result<bool, ScrapeError> {
        self.enter(frame).await?;
        let candidates = self.driver.find_all(By::XPath(NEXT_CONTROL_XPATH)).await?;
        let Some(next) = candidates.into_iter().next() else {
            return Ok(false);
        };
        debug!(%frame, "Clicking next-page control");
        let args = vec![next.to_json()?];
        self.driver
            .execute("arguments[0].scrollIntoView();", args.clone())
            .await?;
        sleep(SCROLL_PAUSE).await;
        self.driver.execute("arguments[0].click();", args).await?;
        Ok(true)
    }

    async fn close(self) -> Result<(), ScrapeError> {
        self.driver.quit().await?;
        Ok(())
    }
}
