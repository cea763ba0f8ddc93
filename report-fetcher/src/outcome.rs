use crate::record::PredictionRecord;
use serde::{Deserialize, Serialize};

pub const FETCHING_GLYPH: &str = "\u{1F504}";
pub const FOUND_GLYPH: &str = "\u{2705}";
pub const NOT_FOUND_GLYPH: &str = "\u{26A0}\u{FE0F}";
pub const ERROR_GLYPH: &str = "\u{274C}";

pub const FETCHING_MESSAGE: &str = "Fetching...";
pub const NOT_FOUND_MESSAGE: &str = "No report found for this email.";

/// Terminal result of one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum ReportOutcome {
    Found(PredictionRecord),
    NotFound,
    Error(String)
}

impl ReportOutcome {
    /// Display string for the presentation surface.
    pub fn render(&self, with_glyph: bool) -> String {
        let (glyph, body) = match self {
            Self::Found(record) => (FOUND_GLYPH, record.render()),
            Self::NotFound => (NOT_FOUND_GLYPH, NOT_FOUND_MESSAGE.to_string()),
            Self::Error(message) => (ERROR_GLYPH, format!("Error: {message}"))
        };
        with_status_glyph(glyph, &body, with_glyph)
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn record(&self) -> Option<&PredictionRecord> {
        match self {
            Self::Found(record) => Some(record),
            _ => None
        }
    }
}

/// Placeholder shown while a lookup is in flight.
pub fn fetching_notice(with_glyph: bool) -> String {
    with_status_glyph(FETCHING_GLYPH, FETCHING_MESSAGE, with_glyph)
}

fn with_status_glyph(glyph: &str, body: &str, with_glyph: bool) -> String {
    if with_glyph {
        format!("{glyph} {body}")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_render() {
        assert_eq!(
            ReportOutcome::NotFound.render(true),
            "\u{26A0}\u{FE0F} No report found for this email."
        );
        assert_eq!(
            ReportOutcome::NotFound.render(false),
            "No report found for this email."
        );
    }

    #[test]
    fn test_error_render() {
        let outcome = ReportOutcome::Error("connection refused".to_string());
        assert_eq!(outcome.render(true), "\u{274C} Error: connection refused");
        assert_eq!(outcome.render(false), "Error: connection refused");
        assert!(outcome.record().is_none());
    }

    #[test]
    fn test_found_render_prefixes_header_only() {
        let outcome = ReportOutcome::Found(PredictionRecord {
            email: "a@b.co".to_string(),
            age: 61,
            blood_pressure: 145,
            cholesterol: 250,
            result: "Medium Risk".to_string(),
            created_at: "2025-01-02T03:04:05Z".to_string()
        });
        let text = outcome.render(true);
        assert!(text.starts_with("\u{2705} Report for a@b.co\nAge: 61"));
        assert!(outcome.is_found());
    }

    #[test]
    fn test_fetching_notice() {
        assert_eq!(fetching_notice(true), "\u{1F504} Fetching...");
        assert_eq!(fetching_notice(false), "Fetching...");
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&ReportOutcome::NotFound).unwrap();
        assert_eq!(json, r#"{"outcome":"not_found"}"#);
    }
}
