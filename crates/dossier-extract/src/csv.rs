//! CSV text extraction
//!
//! Renders every record as one ` | `-joined line so the model sees the
//! tabular structure without needing the original delimiter. The delimiter
//! is sniffed from the first line (`;` is common in German exports).

use ::csv::ReaderBuilder;

use dossier_core::{DossierError, Result};

use crate::text;

/// Extract text from CSV bytes
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    // Reuse the TXT encoding fallback before parsing
    let decoded = text::extract_text(bytes)?;

    let delimiter = sniff_delimiter(&decoded);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(decoded.as_bytes());

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DossierError::ExtractionFailure(format!("CSV: {e}")))?;
        let fields: Vec<&str> = record.iter().map(str::trim).collect();
        lines.push(fields.join(" | "));
    }

    Ok(lines.join("\n"))
}

/// Pick the most frequent candidate delimiter in the first line
fn sniff_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    [b';', b',', b'\t']
        .into_iter()
        .max_by_key(|&d| first_line.bytes().filter(|&b| b == d).count())
        .unwrap_or(b',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated() {
        let text = extract_text(b"Datum,Betrag,Empfaenger\n2024-01-15,5000,ABC GmbH\n").unwrap();
        assert_eq!(text, "Datum | Betrag | Empfaenger\n2024-01-15 | 5000 | ABC GmbH");
    }

    #[test]
    fn test_semicolon_sniffing() {
        let text = extract_text(b"Datum;Betrag;Text\n01.02.2024;1.200,50;Miete\n").unwrap();
        // The comma inside "1.200,50" must not split the field
        assert!(text.contains("1.200,50"));
        assert!(text.starts_with("Datum | Betrag | Text"));
    }

    #[test]
    fn test_ragged_rows_are_tolerated() {
        let text = extract_text(b"a,b,c\nd,e\n").unwrap();
        assert_eq!(text, "a | b | c\nd | e");
    }
}
