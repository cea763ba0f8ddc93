use crate::error::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored health-risk prediction, as returned by the backend.
///
/// Read-only and transient: built per request and dropped after rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub email: String,
    pub age: i64,
    pub blood_pressure: i64,
    pub cholesterol: i64,
    pub result: String,
    pub created_at: String
}

const REPORT_HEADER: &str = "Report for ";
const AGE: &str = "Age: ";
const BLOOD_PRESSURE: &str = "Blood Pressure: ";
const CHOLESTEROL: &str = "Cholesterol: ";
const RESULT: &str = "Result: ";
const DATE: &str = "Date: ";

impl PredictionRecord {
    /// Multi-line summary shown to the user, without a status glyph.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Recovers a record from [`PredictionRecord::render`] output.
    ///
    /// Blank lines before the header and anything ahead of `Report for ` on
    /// it (a status glyph) are skipped. Field values are taken verbatim, so
    /// surrounding whitespace and empty strings survive; a label with its
    /// trailing space stripped (`Result:`) reads as an empty value.
    pub fn from_rendered(text: &str) -> ReportResult<Self> {
        let mut lines = text.split('\n').skip_while(|l| l.trim().is_empty());

        let header = lines.next().unwrap_or_default();
        let email = header
            .find(REPORT_HEADER)
            .map(|idx| header[idx + REPORT_HEADER.len()..].to_string())
            .ok_or_else(|| missing(REPORT_HEADER))?;

        let mut next_field = |label: &'static str| -> ReportResult<String> {
            lines
                .next()
                .and_then(|line| {
                    line.strip_prefix(label)
                        .or_else(|| (line == label.trim_end()).then_some(""))
                })
                .map(str::to_string)
                .ok_or_else(|| missing(label))
        };

        let age = parse_int(AGE, &next_field(AGE)?)?;
        let blood_pressure = parse_int(BLOOD_PRESSURE, &next_field(BLOOD_PRESSURE)?)?;
        let cholesterol = parse_int(CHOLESTEROL, &next_field(CHOLESTEROL)?)?;
        let result = next_field(RESULT)?;
        let created_at = next_field(DATE)?;

        Ok(Self {
            email,
            age,
            blood_pressure,
            cholesterol,
            result,
            created_at
        })
    }
}

impl fmt::Display for PredictionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{REPORT_HEADER}{}", self.email)?;
        writeln!(f, "{AGE}{}", self.age)?;
        writeln!(f, "{BLOOD_PRESSURE}{}", self.blood_pressure)?;
        writeln!(f, "{CHOLESTEROL}{}", self.cholesterol)?;
        writeln!(f, "{RESULT}{}", self.result)?;
        write!(f, "{DATE}{}", self.created_at)
    }
}

fn missing(label: &str) -> ReportError {
    ReportError::MalformedResponse(format!(
        "rendered report is missing '{}'",
        label.trim_end_matches([':', ' '])
    ))
}

fn parse_int(label: &str, value: &str) -> ReportResult<i64> {
    value.trim().parse().map_err(|_| {
        ReportError::MalformedResponse(format!(
            "rendered report has a non-numeric '{}': {value}",
            label.trim_end_matches([':', ' '])
        ))
    })
}
