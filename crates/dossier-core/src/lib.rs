//! Dossier Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the dossier
//! pipeline:
//! - Batch and analysis models (files, entity sets, records, reports)
//! - The per-file error taxonomy
//! - Shared traits for text extraction and inference backends
//! - Configuration management

pub mod config;

pub use config::{AppConfig, BatchConfig, ConfigError, Environment, InferenceProvider, LlmConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error type for pipeline operations
#[derive(Error, Debug)]
pub enum DossierError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Text extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("Inference request timed out")]
    InferenceTimeout,

    #[error("Inference request failed: {0}")]
    InferenceError(String),

    #[error("Model output could not be interpreted: {0}")]
    ParseFailure(String),

    #[error("Batch contains no files")]
    EmptyBatch,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DossierError>;

/// Per-file failure classification recorded in the batch report
///
/// Every variant is non-fatal to the batch: a file that fails with any of
/// these still produces an `AnalysisRecord`, and the batch completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisErrorKind {
    UnsupportedFormat,
    FileTooLarge,
    ExtractionFailure,
    InferenceTimeout,
    InferenceError,
    ParseFailure,
}

impl std::fmt::Display for AnalysisErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat => write!(f, "unsupported_format"),
            Self::FileTooLarge => write!(f, "file_too_large"),
            Self::ExtractionFailure => write!(f, "extraction_failure"),
            Self::InferenceTimeout => write!(f, "inference_timeout"),
            Self::InferenceError => write!(f, "inference_error"),
            Self::ParseFailure => write!(f, "parse_failure"),
        }
    }
}

impl DossierError {
    /// Map an error to its per-file classification, if it has one
    ///
    /// `EmptyBatch` and `Config` are not per-file conditions and return
    /// `None`; they must never end up inside an `AnalysisRecord`.
    pub fn kind(&self) -> Option<AnalysisErrorKind> {
        match self {
            Self::UnsupportedFormat(_) => Some(AnalysisErrorKind::UnsupportedFormat),
            Self::FileTooLarge { .. } => Some(AnalysisErrorKind::FileTooLarge),
            Self::ExtractionFailure(_) => Some(AnalysisErrorKind::ExtractionFailure),
            Self::InferenceTimeout => Some(AnalysisErrorKind::InferenceTimeout),
            Self::InferenceError(_) => Some(AnalysisErrorKind::InferenceError),
            Self::ParseFailure(_) => Some(AnalysisErrorKind::ParseFailure),
            Self::EmptyBatch | Self::Config(_) | Self::Other(_) => None,
        }
    }
}

// ============================================================================
// Batch Input
// ============================================================================

/// One file of a batch request: the logical `(filename, bytes)` pair
#[derive(Debug, Clone)]
pub struct BatchFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl BatchFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// File size in bytes
    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Extracted text for one document, after the truncation policy ran
///
/// Produced once per document and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub truncated: bool,
}

// ============================================================================
// Analysis Models
// ============================================================================

/// Investigator-facing triage label assigned per document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Hoch,
    Mittel,
    Gering,
}

impl Relevance {
    /// Coerce a free-text model label into one of the three values
    ///
    /// Anything the model emits that is not recognizably `hoch` or `mittel`
    /// maps to `Gering` as the conservative default. This is the documented
    /// fallback, not silent data loss: the raw label never reaches the
    /// report anyway.
    pub fn coerce(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.starts_with("hoch") {
            Self::Hoch
        } else if label.starts_with("mittel") {
            Self::Mittel
        } else {
            Self::Gering
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hoch => "hoch",
            Self::Mittel => "mittel",
            Self::Gering => "gering",
        }
    }
}

impl std::fmt::Display for Relevance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entities extracted from one document, grouped by type
///
/// Wire names follow the investigator-facing report format. `identifiers`
/// collects IBANs and tax numbers the model reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    #[serde(rename = "firmen", default)]
    pub companies: Vec<String>,

    #[serde(rename = "personen", default)]
    pub persons: Vec<String>,

    #[serde(rename = "geldbetraege", default)]
    pub amounts: Vec<String>,

    #[serde(rename = "kennungen", default)]
    pub identifiers: Vec<String>,

    #[serde(rename = "daten", default)]
    pub dates: Vec<String>,

    #[serde(rename = "auffaelligkeiten", default)]
    pub anomalies: Vec<String>,
}

impl EntitySet {
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
            && self.persons.is_empty()
            && self.amounts.is_empty()
            && self.identifiers.is_empty()
            && self.dates.is_empty()
            && self.anomalies.is_empty()
    }

    /// Total number of extracted entity strings across all types
    pub fn len(&self) -> usize {
        self.companies.len()
            + self.persons.len()
            + self.amounts.len()
            + self.identifiers.len()
            + self.dates.len()
            + self.anomalies.len()
    }
}

/// Structured analysis of one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    #[serde(rename = "kategorie")]
    pub category: String,

    #[serde(rename = "zusammenfassung")]
    pub summary: String,

    #[serde(flatten)]
    pub entities: EntitySet,
}

/// One result entry per submitted file, success or failure
///
/// Created by the orchestrator, immutable afterwards, owned by the batch
/// report. `document_id` is the submission index, stable within the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub document_id: usize,
    pub filename: String,
    pub success: bool,

    #[serde(rename = "relevanz", skip_serializing_if = "Option::is_none")]
    pub relevance: Option<Relevance>,

    #[serde(rename = "analyse", skip_serializing_if = "Option::is_none")]
    pub analysis: Option<DocumentAnalysis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<AnalysisErrorKind>,

    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalysisRecord {
    /// Record a successfully analyzed document
    pub fn succeeded(
        document_id: usize,
        filename: impl Into<String>,
        relevance: Relevance,
        analysis: DocumentAnalysis,
        truncated: bool,
    ) -> Self {
        Self {
            document_id,
            filename: filename.into(),
            success: true,
            relevance: Some(relevance),
            analysis: Some(analysis),
            truncated: Some(truncated),
            error_kind: None,
            message: None,
        }
    }

    /// Record a failed document
    pub fn failed(
        document_id: usize,
        filename: impl Into<String>,
        kind: AnalysisErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            document_id,
            filename: filename.into(),
            success: false,
            relevance: None,
            analysis: None,
            truncated: None,
            error_kind: Some(kind),
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Cross-Reference Models
// ============================================================================

/// An entity appearing in two or more documents of the same batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    /// Canonical (normalized) value used as the correlation key
    pub value: String,

    /// Display form preserving the original casing
    pub display: String,

    /// Ids of the documents whose entity lists contain this value.
    /// Invariant: at least two distinct ids.
    pub document_ids: Vec<usize>,
}

/// Cross-document correlation result, one list per entity type
///
/// Entries are ordered by descending number of linked documents, then by
/// canonical value, so the report is reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossReferenceIndex {
    #[serde(rename = "firmen")]
    pub companies: Vec<CrossReference>,

    #[serde(rename = "personen")]
    pub persons: Vec<CrossReference>,

    #[serde(rename = "geldbetraege")]
    pub amounts: Vec<CrossReference>,
}

impl CrossReferenceIndex {
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty() && self.persons.is_empty() && self.amounts.is_empty()
    }

    /// Total number of cross-referenced entities across all types
    pub fn len(&self) -> usize {
        self.companies.len() + self.persons.len() + self.amounts.len()
    }
}

// ============================================================================
// Batch Report
// ============================================================================

/// Final report for one batch request
///
/// Built once per batch, then handed to the caller; never persisted by the
/// core. `results` is ordered by submission order regardless of completion
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_files: usize,
    pub processed: usize,
    pub failed: usize,
    pub total_time_sec: f64,
    pub model: String,
    pub results: Vec<AnalysisRecord>,
    pub cross_references: CrossReferenceIndex,
    pub overview: String,
}

// ============================================================================
// Traits
// ============================================================================

/// Text extraction backend: maps a validated file to plain text
pub trait TextExtractor: Send + Sync {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String>;
}

/// Inference backend: maps a prompt to a text completion
///
/// Implementations are shared read-only across concurrent analyses and must
/// bound every call by the configured request timeout, surfacing
/// `DossierError::InferenceTimeout` when it elapses.
#[async_trait::async_trait]
pub trait InferenceClient: Send + Sync {
    /// Generate a completion for the prompt, bounded by `max_tokens`
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Model name, reported in the batch report
    fn model(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
