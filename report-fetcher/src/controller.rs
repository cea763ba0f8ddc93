//! Boundary with the presentation layer.
//!
//! The UI hands over raw input and receives display strings through
//! [`ReportView`]; it never sees `ReportError` or blocks on the network.

use crate::fetcher::ReportFetcher;
use crate::outcome::{ReportOutcome, fetching_notice};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Display target owned by the presentation layer.
pub trait ReportView: Send + Sync {
    fn show(&self, text: &str);
}

pub struct ReportController {
    fetcher: ReportFetcher,
    view: Arc<dyn ReportView>,
    status_glyphs: bool
}

impl ReportController {
    pub fn new(fetcher: ReportFetcher, view: Arc<dyn ReportView>, status_glyphs: bool) -> Self {
        Self {
            fetcher,
            view,
            status_glyphs
        }
    }

    /// Handles one user submission.
    ///
    /// Blank input returns `None` and leaves the view untouched. Otherwise the
    /// fetching notice is shown immediately and the lookup runs on a spawned
    /// task, which renders its outcome into the view and returns it. Aborting
    /// the handle before completion keeps the outcome off the view.
    ///
    /// Submissions are not deduplicated; whichever lookup finishes last owns
    /// the display. Must be called from within a tokio runtime.
    pub fn submit(&self, raw_email: &str) -> Option<JoinHandle<ReportOutcome>> {
        let email = raw_email.trim();
        if email.is_empty() {
            debug!("Ignoring blank email submission");
            return None;
        }

        self.view.show(&fetching_notice(self.status_glyphs));

        let fetcher = self.fetcher.clone();
        let view = self.view.clone();
        let status_glyphs = self.status_glyphs;
        let email = email.to_string();

        Some(tokio::spawn(async move {
            let outcome = fetcher.fetch(&email).await;
            view.show(&outcome.render(status_glyphs));
            outcome
        }))
    }
}
