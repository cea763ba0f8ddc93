use crate::client::{PostgrestClient, RecordSource};
use crate::config::FetcherConfig;
use crate::error::{ReportError, ReportResult};
use crate::outcome::ReportOutcome;
use crate::record::PredictionRecord;
use std::sync::Arc;
use tracing::{info, warn};

/// Looks up the latest prediction report for an email.
///
/// All failures are folded into [`ReportOutcome::Error`]; `fetch` never
/// returns an error or panics on a bad response.
#[derive(Clone)]
pub struct ReportFetcher {
    source: Arc<dyn RecordSource>
}

impl ReportFetcher {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    pub fn from_config(config: FetcherConfig) -> ReportResult<Self> {
        Ok(Self::new(Arc::new(PostgrestClient::from_config(config)?)))
    }

    pub async fn fetch(&self, email: &str) -> ReportOutcome {
        match self.try_fetch(email).await {
            Ok(Some(record)) => {
                info!(created_at = %record.created_at, "Prediction report found");
                ReportOutcome::Found(record)
            }
            Ok(None) => {
                info!("No prediction report for email");
                ReportOutcome::NotFound
            }
            Err(e) => {
                warn!(error = %e, "Prediction report lookup failed");
                ReportOutcome::Error(e.to_string())
            }
        }
    }

    /// Same lookup as [`ReportFetcher::fetch`] with the error kept typed.
    pub async fn try_fetch(&self, email: &str) -> ReportResult<Option<PredictionRecord>> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ReportError::EmptyInput);
        }
        self.source.latest_for_email(email).await
    }
}
