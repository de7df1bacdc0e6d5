//! Operator confirmation for the manual CAPTCHA step.
//!
//! Portals put a CAPTCHA in front of the search form, so after a site is
//! loaded the scraper waits for a human to solve it and submit the search.
//! The wait is a channel: the scraper holds an [`OperatorGate`], whatever
//! drives the UI holds a [`GateHandle`] and calls [`GateHandle::confirm`]
//! once per site. Each confirmation releases exactly one wait.

use crate::error::ScrapeError;
use crate::models::Site;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// The waiting side, owned by the scraper.
#[derive(Debug)]
pub struct OperatorGate {
    rx: mpsc::UnboundedReceiver<()>,
}

/// The confirming side, owned by the UI.
#[derive(Debug, Clone)]
pub struct GateHandle {
    tx: mpsc::UnboundedSender<()>,
}

/// Create a connected gate/handle pair.
pub fn operator_gate() -> (GateHandle, OperatorGate) {
    let (tx, rx) = mpsc::unbounded_channel();
    (GateHandle { tx }, OperatorGate { rx })
}

impl GateHandle {
    /// Release one waiting site. Returns `false` once the gate is gone.
    pub fn confirm(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

impl OperatorGate {
    /// Block until the operator confirms `site` is ready to be read.
    ///
    /// Fails with [`ScrapeError::GateClosed`] when every handle was dropped.
    #[instrument(level = "info", skip_all, fields(site = %site.name))]
    pub async fn wait_for_operator(&mut self, site: &Site) -> Result<(), ScrapeError> {
        info!("Waiting for operator: solve the CAPTCHA, run the search, then confirm");
        match self.rx.recv().await {
            Some(()) => {
                debug!("Operator confirmed");
                Ok(())
            }
            None => Err(ScrapeError::GateClosed {
                site: site.name.clone(),
            }),
        }
    }
}

/// Confirm the gate once per line read from stdin.
///
/// Runs until stdin closes or the gate is dropped.
pub async fn confirm_from_stdin(handle: GateHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(_)) = lines.next_line().await {
        if !handle.confirm() {
            break;
        }
    }
    debug!("stdin confirmation reader finished");
}
