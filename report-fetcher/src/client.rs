use crate::config::FetcherConfig;
use crate::error::{ReportError, ReportResult};
use crate::record::PredictionRecord;
use crate::secret::SecretProvider;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// Read-only access to the remote prediction records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Most recent record for `email` by `created_at`, if any.
    async fn latest_for_email(&self, email: &str) -> ReportResult<Option<PredictionRecord>>;
}

/// `RecordSource` backed by a PostgREST endpoint.
pub struct PostgrestClient {
    client: Client,
    config: FetcherConfig,
    secrets: Arc<dyn SecretProvider>
}

impl PostgrestClient {
    pub fn new(config: FetcherConfig, secrets: Arc<dyn SecretProvider>) -> ReportResult<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ReportError::Transport)?;

        Ok(Self {
            client,
            config,
            secrets
        })
    }

    /// Uses the provider implied by the config's own `api_key` reference.
    pub fn from_config(config: FetcherConfig) -> ReportResult<Self> {
        let secrets = config.api_key.provider();
        Self::new(config, secrets)
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Filtered, ordered, single-row read for `email`.
    pub fn lookup_url(&self, email: &str) -> String {
        format!(
            "{}?email=eq.{}&order=created_at.desc&limit=1",
            self.config.table_url(),
            urlencoding::encode(email)
        )
    }

    async fn get_records(&self, url: &str) -> ReportResult<Vec<PredictionRecord>> {
        let api_key = self
            .secrets
            .get_secret(self.config.api_key.id())
            .await?;

        let response = self
            .client
            .get(url)
            .header("apikey", &api_key)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body = String::from_utf8(bytes.to_vec())
            .map_err(|e| ReportError::MalformedResponse(format!("body is not UTF-8: {e}")))?;

        // Only a plain 200 carries the record array.
        if status != StatusCode::OK {
            return Err(ReportError::from_status_body(status, &body));
        }

        Ok(serde_json::from_str::<Vec<PredictionRecord>>(&body)?)
    }
}

#[async_trait]
impl RecordSource for PostgrestClient {
    async fn latest_for_email(&self, email: &str) -> ReportResult<Option<PredictionRecord>> {
        let url = self.lookup_url(email);
        debug!(url = %url, "Requesting latest prediction record");

        let records = self.get_records(&url).await?;
        debug!(count = records.len(), "Received prediction records");

        // The server orders by created_at desc; the head is the latest.
        Ok(records.into_iter().next())
    }
}

pub fn create_postgrest_source(config: FetcherConfig) -> ReportResult<Arc<dyn RecordSource>> {
    Ok(Arc::new(PostgrestClient::from_config(config)?))
}
