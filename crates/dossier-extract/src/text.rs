//! Plain-text extraction with encoding fallback
//!
//! Evidentiary text files regularly arrive in legacy Windows encodings.
//! UTF-8 is tried first; anything else decodes as Windows-1252, which
//! covers the Latin-1 family seen in practice.

use dossier_core::{DossierError, Result};

/// Extract text from TXT bytes
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.to_string());
    }

    let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if had_errors {
        return Err(DossierError::ExtractionFailure(
            "could not decode text file encoding".to_string(),
        ));
    }

    Ok(decoded.into_owned())
}
