//! Dossier Extract - File admission and text extraction
//!
//! Everything between raw upload bytes and analyzable plain text:
//! - Format gate: extension and size validation before any work happens
//! - Text extraction for the admitted formats (PDF, Word, plain text, CSV,
//!   e-mail)
//! - Truncation policy bounding text length before inference
//!
//! Each format has its own module producing plain text from bytes; the
//! `DocumentExtractor` dispatches on the detected file type.

pub mod csv;
pub mod docx;
pub mod eml;
pub mod pdf;
pub mod text;

use dossier_core::{DossierError, ExtractedText, Result, TextExtractor};

// ============================================================================
// File Types
// ============================================================================

/// File formats admitted by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Txt,
    Docx,
    Doc,
    Csv,
    Eml,
}

/// Extensions the gate admits, in report order
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["pdf", "txt", "docx", "doc", "csv", "eml"];

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "csv" => Some(Self::Csv),
            "eml" => Some(Self::Eml),
            _ => None,
        }
    }

    /// Detect file type from a filename
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Get MIME type
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Txt => "text/plain",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Doc => "application/msword",
            Self::Csv => "text/csv",
            Self::Eml => "message/rfc822",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Txt => write!(f, "txt"),
            Self::Docx => write!(f, "docx"),
            Self::Doc => write!(f, "doc"),
            Self::Csv => write!(f, "csv"),
            Self::Eml => write!(f, "eml"),
        }
    }
}

// ============================================================================
// Format Gate
// ============================================================================

/// Pure pre-admission validation: extension and size
///
/// Runs once per file before any extraction work, so rejected files never
/// consume extraction or inference capacity.
#[derive(Debug, Clone)]
pub struct FormatGate {
    /// Maximum admitted file size in bytes
    pub max_file_size: u64,
}

impl FormatGate {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Validate a file, returning its detected type on admission
    pub fn admit(&self, filename: &str, byte_len: u64) -> Result<FileType> {
        let file_type = FileType::from_filename(filename).ok_or_else(|| {
            let ext = filename
                .rsplit_once('.')
                .map(|(_, e)| e.to_string())
                .unwrap_or_else(|| filename.to_string());
            DossierError::UnsupportedFormat(ext)
        })?;

        if byte_len > self.max_file_size {
            return Err(DossierError::FileTooLarge {
                size: byte_len,
                limit: self.max_file_size,
            });
        }

        Ok(file_type)
    }
}

impl Default for FormatGate {
    fn default() -> Self {
        Self::new(32 * 1024 * 1024)
    }
}

// ============================================================================
// Truncation Policy
// ============================================================================

/// Bound text length before inference
///
/// Head-based and deterministic: texts longer than `max_chars` keep exactly
/// their first `max_chars` characters. Idempotent by construction.
pub fn truncate_text(text: String, max_chars: usize) -> ExtractedText {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => ExtractedText {
            text: text[..byte_idx].to_string(),
            truncated: true,
        },
        None => ExtractedText {
            text,
            truncated: false,
        },
    }
}

// ============================================================================
// Document Extractor
// ============================================================================

/// Text extraction dispatching on the detected file type
///
/// Legacy `.doc` files go through the DOCX path, as the upstream toolchain
/// does; files that are not actually ZIP-based surface as
/// `ExtractionFailure`.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let file_type = FileType::from_filename(filename).ok_or_else(|| {
            DossierError::UnsupportedFormat(filename.to_string())
        })?;

        tracing::debug!(filename, %file_type, bytes = bytes.len(), "extracting text");

        match file_type {
            FileType::Pdf => pdf::extract_text(bytes),
            FileType::Docx | FileType::Doc => docx::extract_text(bytes),
            FileType::Txt => text::extract_text(bytes),
            FileType::Csv => csv::extract_text(bytes),
            FileType::Eml => eml::extract_text(bytes),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
