use crate::secret::SecretError;
use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

/// Longest slice of a raw error body carried into a diagnostic.
const MAX_DIAGNOSTIC_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Email must not be empty")]
    EmptyInput,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Credential error: {0}")]
    Secret(#[from] SecretError)
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

impl ReportError {
    /// Builds an `UnexpectedStatus` from a non-success response body.
    ///
    /// PostgREST answers failures with `{"message", "code", "details", "hint"}`;
    /// anything else falls back to the raw text, then to the status reason.
    pub fn from_status_body(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<PostgrestErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                let raw = body.trim();
                if raw.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown status")
                        .to_string()
                } else {
                    raw.chars().take(MAX_DIAGNOSTIC_LEN).collect()
                }
            });

        Self::UnexpectedStatus {
            status: status.as_u16(),
            message
        }
    }

    pub fn status(&self) -> Option<u16> {
        if let Self::UnexpectedStatus { status, .. } = self {
            Some(*status)
        } else {
            None
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>
}
