use crate::error::{ReportError, ReportResult};
use crate::secret::SecretRef;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the report lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Root address of the PostgREST service, without the `/rest/v1` suffix.
    pub base_url: String,
    /// Table holding prediction records.
    #[serde(default = "default_table")]
    pub table: String,
    /// API key, sent both as `apikey` and as the bearer token.
    pub api_key: SecretRef,
    /// Prefix rendered outcomes with a status glyph.
    #[serde(default = "default_status_glyphs")]
    pub status_glyphs: bool,
    /// Request timeout; `None` leaves the transport default in place.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>
}

fn default_table() -> String {
    "predictions".to_string()
}

fn default_status_glyphs() -> bool {
    true
}

impl FetcherConfig {
    /// Creates a configuration from environment variables.
    ///
    /// - `REPORT_BASE_URL` (required)
    /// - `REPORT_API_KEY`, or `REPORT_API_KEY_ENV` naming the variable to read
    ///   the key from at request time (one of the two is required)
    /// - `REPORT_TABLE` (default: "predictions")
    /// - `REPORT_STATUS_GLYPHS` (true/false, default: true)
    /// - `REPORT_TIMEOUT_SECONDS` (default: unset)
    pub fn from_env() -> ReportResult<Self> {
        let base_url = std::env::var("REPORT_BASE_URL")
            .map_err(|_| ReportError::Configuration("REPORT_BASE_URL not set".to_string()))?;

        let api_key = match (
            std::env::var("REPORT_API_KEY").ok(),
            std::env::var("REPORT_API_KEY_ENV").ok()
        ) {
            (Some(key), _) => SecretRef::Static(key),
            (None, Some(var)) => SecretRef::Env(var),
            (None, None) => {
                return Err(ReportError::Configuration(
                    "REPORT_API_KEY or REPORT_API_KEY_ENV must be set".to_string()
                ));
            }
        };

        let mut builder = Self::builder()
            .base_url(base_url)
            .api_key(api_key)
            .status_glyphs(
                std::env::var("REPORT_STATUS_GLYPHS")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(true)
            );
        if let Ok(table) = std::env::var("REPORT_TABLE") {
            builder = builder.table(table);
        }
        if let Some(secs) = std::env::var("REPORT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            builder = builder.request_timeout_seconds(secs);
        }
        builder.build()
    }

    #[must_use]
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder::default()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }

    /// `{base_url}/rest/v1/{table}` with any trailing slash on the base removed.
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }

    pub fn validate(&self) -> ReportResult<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ReportError::Configuration(
                "base_url must not be empty".to_string()
            ));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ReportError::Configuration(format!(
                "base_url must be an http(s) URL: {base}"
            )));
        }
        if self.table.is_empty()
            || !self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ReportError::Configuration(format!(
                "table must be a non-empty [A-Za-z0-9_] identifier: {:?}",
                self.table
            )));
        }
        Ok(())
    }
}

/// Builder for `FetcherConfig`.
#[derive(Default)]
pub struct FetcherConfigBuilder {
    base_url: Option<String>,
    table: Option<String>,
    api_key: Option<SecretRef>,
    status_glyphs: Option<bool>,
    request_timeout_seconds: Option<u64>
}

impl FetcherConfigBuilder {
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    #[must_use]
    pub fn api_key(mut self, key: SecretRef) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Shorthand for `api_key(SecretRef::Static(..))`.
    #[must_use]
    pub fn static_api_key(self, key: impl Into<String>) -> Self {
        self.api_key(SecretRef::Static(key.into()))
    }

    #[must_use]
    pub fn status_glyphs(mut self, enabled: bool) -> Self {
        self.status_glyphs = Some(enabled);
        self
    }

    #[must_use]
    pub fn request_timeout_seconds(mut self, secs: u64) -> Self {
        self.request_timeout_seconds = Some(secs);
        self
    }

    pub fn build(self) -> ReportResult<FetcherConfig> {
        let base_url = self
            .base_url
            .ok_or_else(|| ReportError::Configuration("base_url is required".to_string()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| ReportError::Configuration("api_key is required".to_string()))?;

        let config = FetcherConfig {
            base_url,
            table: self.table.unwrap_or_else(default_table),
            api_key,
            status_glyphs: self.status_glyphs.unwrap_or(true),
            request_timeout_seconds: self.request_timeout_seconds
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            for key in [
                "REPORT_BASE_URL",
                "REPORT_API_KEY",
                "REPORT_API_KEY_ENV",
                "REPORT_TABLE",
                "REPORT_STATUS_GLYPHS",
                "REPORT_TIMEOUT_SECONDS"
            ] {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = FetcherConfig::builder()
            .base_url("https://example.supabase.co/")
            .static_api_key("anon")
            .build()
            .unwrap();
        assert_eq!(config.table, "predictions");
        assert!(config.status_glyphs);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(
            config.table_url(),
            "https://example.supabase.co/rest/v1/predictions"
        );
    }

    #[test]
    fn test_builder_requires_base_url_and_key() {
        let err = FetcherConfig::builder().static_api_key("k").build().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: base_url is required");

        let err = FetcherConfig::builder()
            .base_url("https://example.supabase.co")
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: api_key is required");
    }

    #[test]
    fn test_builder_rejects_non_http_base() {
        let err = FetcherConfig::builder()
            .base_url("ftp://example.com")
            .static_api_key("k")
            .build()
            .unwrap_err();
        assert!(matches!(err, ReportError::Configuration(_)));
    }

    #[test]
    fn test_builder_rejects_table_that_alters_url() {
        for table in ["p?x=1", "predictions/../users", "risk predictions", "", "t#frag"] {
            let err = FetcherConfig::builder()
                .base_url("https://example.supabase.co")
                .static_api_key("k")
                .table(table)
                .build()
                .unwrap_err();
            assert!(
                err.to_string().contains("table must be"),
                "accepted table {table:?}"
            );
        }

        let config = FetcherConfig::builder()
            .base_url("https://example.supabase.co")
            .static_api_key("k")
            .table("risk_predictions_v2")
            .build()
            .unwrap();
        assert_eq!(
            config.table_url(),
            "https://example.supabase.co/rest/v1/risk_predictions_v2"
        );
    }

    #[test]
    fn test_serialized_config_hides_static_key() {
        let config = FetcherConfig::builder()
            .base_url("https://example.supabase.co")
            .static_api_key("plaintext-anon-key")
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("plaintext-anon-key"));
        assert!(json.contains("<redacted>"));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: FetcherConfig = serde_json::from_str(
            r#"{"base_url":"http://localhost:54321","api_key":{"source":"env","value":"ANON_KEY"}}"#
        )
        .unwrap();
        assert_eq!(config.table, "predictions");
        assert!(config.status_glyphs);
        assert_eq!(config.api_key, SecretRef::Env("ANON_KEY".to_string()));
        assert_eq!(config.request_timeout_seconds, None);
    }

    #[test]
    #[serial]
    fn test_from_env_requires_base_url() {
        clear_env();
        let err = FetcherConfig::from_env().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: REPORT_BASE_URL not set");
    }

    #[test]
    #[serial]
    fn test_from_env_requires_credential() {
        clear_env();
        unsafe {
            std::env::set_var("REPORT_BASE_URL", "https://example.supabase.co");
        }
        let err = FetcherConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("REPORT_API_KEY"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("REPORT_BASE_URL", "https://example.supabase.co");
            std::env::set_var("REPORT_API_KEY_ENV", "SUPABASE_ANON_KEY");
            std::env::set_var("REPORT_TABLE", "risk_predictions");
            std::env::set_var("REPORT_STATUS_GLYPHS", "false");
            std::env::set_var("REPORT_TIMEOUT_SECONDS", "15");
        }

        let config = FetcherConfig::from_env().unwrap();
        assert_eq!(config.table, "risk_predictions");
        assert_eq!(
            config.api_key,
            SecretRef::Env("SUPABASE_ANON_KEY".to_string())
        );
        assert!(!config.status_glyphs);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_static_key_wins() {
        clear_env();
        unsafe {
            std::env::set_var("REPORT_BASE_URL", "https://example.supabase.co");
            std::env::set_var("REPORT_API_KEY", "anon");
            std::env::set_var("REPORT_API_KEY_ENV", "IGNORED");
        }
        let config = FetcherConfig::from_env().unwrap();
        assert_eq!(config.api_key, SecretRef::Static("anon".to_string()));
        clear_env();
    }
}
