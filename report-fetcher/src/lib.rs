//! # Report Fetcher
//!
//! Looks up the most recent health-risk prediction stored for an email
//! address in a PostgREST backend and renders it for display.
//!
//! ```text
//! ┌──────────────┐ email  ┌──────────────────┐  GET /rest/v1/predictions  ┌───────────┐
//! │  ReportView  │◄──────►│ ReportController │──► ReportFetcher ─────────►│ PostgREST │
//! │     (UI)     │ text   └──────────────────┘    (RecordSource)          └───────────┘
//! └──────────────┘
//! ```
//!
//! Every lookup ends in one of three outcomes: `Found`, `NotFound` or
//! `Error`. Failures never escape [`ReportFetcher::fetch`].
//!
//! [`VitalsExtractor`] reads the same vitals out of OCR'd lab-report text.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod outcome;
pub mod record;
pub mod secret;
pub mod telemetry;

pub use client::{PostgrestClient, RecordSource, create_postgrest_source};
pub use config::FetcherConfig;
pub use controller::{ReportController, ReportView};
pub use error::{ReportError, ReportResult};
pub use extract::{ExtractedVitals, VitalsExtractor};
pub use fetcher::ReportFetcher;
pub use outcome::ReportOutcome;
pub use record::PredictionRecord;
pub use secret::{SecretError, SecretProvider, SecretRef};
