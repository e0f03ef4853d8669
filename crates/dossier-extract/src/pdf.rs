//! PDF text extraction using pdf-extract
//!
//! Produces the full document text with a page marker line before each
//! page, so downstream summaries can reference page positions.

use dossier_core::{DossierError, Result};

/// Extract text from PDF bytes
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| DossierError::ExtractionFailure(format!("PDF: {e}")))?;

    // pdf-extract separates pages with form feeds
    if !raw.contains('\x0C') {
        return Ok(raw.trim().to_string());
    }

    let mut parts = Vec::new();
    for (idx, page) in raw.split('\x0C').enumerate() {
        let page = page.trim();
        if !page.is_empty() {
            parts.push(format!("--- Seite {} ---\n{}", idx + 1, page));
        }
    }

    Ok(parts.join("\n\n"))
}
