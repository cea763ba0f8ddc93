//! Vitals extraction from OCR'd lab-report text.
//!
//! Pulls age, blood pressure, cholesterol and the patient email out of free
//! text so a prediction can be requested for them. Values the text does not
//! carry fall back to population defaults.

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AGE: i64 = 50;
pub const DEFAULT_BLOOD_PRESSURE: i64 = 120;
pub const DEFAULT_CHOLESTEROL: i64 = 200;
pub const EMAIL_NOT_FOUND: &str = "Not found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedVitals {
    pub age: i64,
    pub blood_pressure: i64,
    pub cholesterol: i64,
    pub email: Option<String>,
    /// Fields that were absent from the text and took their default.
    #[serde(default)]
    pub defaulted: Vec<VitalField>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalField {
    Age,
    BloodPressure,
    Cholesterol,
    Email
}

impl ExtractedVitals {
    /// Email as shown to the user, with the placeholder when none was found.
    pub fn email_or_placeholder(&self) -> &str {
        self.email.as_deref().unwrap_or(EMAIL_NOT_FOUND)
    }
}

pub struct VitalsExtractor {
    age: Regex,
    blood_pressure: Regex,
    cholesterol: Regex,
    number: Regex,
    email: Regex
}

impl VitalsExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            age: Regex::new(r"(?i)\bage\b")?,
            blood_pressure: Regex::new(r"(?i)blood pressure|bp")?,
            cholesterol: Regex::new(r"(?i)cholesterol")?,
            number: Regex::new(r"\d+")?,
            email: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")?
        })
    }

    /// Scans `text` line by line.
    ///
    /// Each line feeds at most one field, checked in the order age, blood
    /// pressure, cholesterol, and contributes the first run of digits on it. A
    /// later matching line overrides an earlier one. The email is searched in
    /// the whole text with whitespace runs collapsed.
    pub fn extract(&self, text: &str) -> ExtractedVitals {
        let mut age = None;
        let mut blood_pressure = None;
        let mut cholesterol = None;

        for line in text.lines().map(str::trim) {
            let slot = if self.age.is_match(line) {
                &mut age
            } else if self.blood_pressure.is_match(line) {
                &mut blood_pressure
            } else if self.cholesterol.is_match(line) {
                &mut cholesterol
            } else {
                continue;
            };
            if let Some(value) = self.first_number(line) {
                *slot = Some(value);
            }
        }

        let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let email = self
            .email
            .find(&flattened)
            .map(|m| m.as_str().to_string());

        let mut defaulted = Vec::new();
        let mut or_default = |value: Option<i64>, default: i64, field: VitalField| {
            value.unwrap_or_else(|| {
                defaulted.push(field);
                default
            })
        };
        let age = or_default(age, DEFAULT_AGE, VitalField::Age);
        let blood_pressure = or_default(
            blood_pressure,
            DEFAULT_BLOOD_PRESSURE,
            VitalField::BloodPressure
        );
        let cholesterol = or_default(cholesterol, DEFAULT_CHOLESTEROL, VitalField::Cholesterol);
        if email.is_none() {
            defaulted.push(VitalField::Email);
        }

        ExtractedVitals {
            age,
            blood_pressure,
            cholesterol,
            email,
            defaulted
        }
    }

    fn first_number(&self, line: &str) -> Option<i64> {
        self.number
            .find(line)
            .and_then(|m| m.as_str().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> VitalsExtractor {
        VitalsExtractor::new().unwrap()
    }

    #[test]
    fn test_extracts_all_fields() {
        let text = "City Lab Report\n\
                    Patient: jane.doe+lab@clinic.example.org\n\
                    Age: 58 years\n\
                    Blood Pressure: 142/90 mmHg\n\
                    Total Cholesterol 236 mg/dL\n";
        let vitals = extractor().extract(text);
        assert_eq!(vitals.age, 58);
        assert_eq!(vitals.blood_pressure, 142);
        assert_eq!(vitals.cholesterol, 236);
        assert_eq!(vitals.email.as_deref(), Some("jane.doe+lab@clinic.example.org"));
        assert!(vitals.defaulted.is_empty());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let vitals = extractor().extract("nothing useful here\nAGE: unknown");
        assert_eq!(vitals.age, DEFAULT_AGE);
        assert_eq!(vitals.blood_pressure, DEFAULT_BLOOD_PRESSURE);
        assert_eq!(vitals.cholesterol, DEFAULT_CHOLESTEROL);
        assert_eq!(vitals.email, None);
        assert_eq!(vitals.email_or_placeholder(), "Not found");
        assert_eq!(
            vitals.defaulted,
            vec![
                VitalField::Age,
                VitalField::BloodPressure,
                VitalField::Cholesterol,
                VitalField::Email
            ]
        );
    }

    #[test]
    fn test_line_feeds_first_matching_field_only() {
        // "age" wins over "bp" on the same line.
        let vitals = extractor().extract("age 40 bp 150\nBP 130");
        assert_eq!(vitals.age, 40);
        assert_eq!(vitals.blood_pressure, 130);
    }

    #[test]
    fn test_later_line_overrides_earlier() {
        let vitals = extractor().extract("Cholesterol 180\ncholesterol (repeat) 195");
        assert_eq!(vitals.cholesterol, 195);
    }

    #[test]
    fn test_age_requires_word_boundary() {
        let vitals = extractor().extract("Page 3 of 4\nDosage 20");
        assert_eq!(vitals.age, DEFAULT_AGE);
    }

    #[test]
    fn test_email_split_across_ocr_whitespace() {
        let vitals = extractor().extract("contact:\n   user@example.com\t\n");
        assert_eq!(vitals.email.as_deref(), Some("user@example.com"));
    }
}
