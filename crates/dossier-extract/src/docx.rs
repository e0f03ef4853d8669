//! Word document text extraction using docx-rs
//!
//! Extracts paragraph text and table contents. Tables are rendered as
//! ` | `-joined rows under a marker line, matching the layout the analysis
//! prompts were written against.

use docx_rs::read_docx;

use dossier_core::{DossierError, Result};

/// Extract text from DOCX bytes
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let docx = read_docx(bytes).map_err(|e| DossierError::ExtractionFailure(format!("DOCX: {e}")))?;

    let mut paragraphs: Vec<String> = Vec::new();
    let mut tables: Vec<String> = Vec::new();

    for child in docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let mut para_text = String::new();
                for child in &para.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for run_child in &run.children {
                            if let docx_rs::RunChild::Text(text) = run_child {
                                para_text.push_str(&text.text);
                            }
                        }
                    }
                }
                if !para_text.trim().is_empty() {
                    paragraphs.push(para_text.trim().to_string());
                }
            }
            docx_rs::DocumentChild::Table(tbl) => {
                let mut table_rows = Vec::new();
                for row in &tbl.rows {
                    let docx_rs::TableChild::TableRow(tr) = row;
                    let mut cells = Vec::new();
                    for cell in &tr.cells {
                        let docx_rs::TableRowChild::TableCell(tc) = cell;
                        let mut cell_text = String::new();
                        for child in &tc.children {
                            if let docx_rs::TableCellContent::Paragraph(para) = child {
                                for para_child in &para.children {
                                    if let docx_rs::ParagraphChild::Run(run) = para_child {
                                        for run_child in &run.children {
                                            if let docx_rs::RunChild::Text(text) = run_child {
                                                cell_text.push_str(&text.text);
                                            }
                                        }
                                    }
                                }
                            }
                        }
                        cells.push(cell_text.trim().to_string());
                    }
                    table_rows.push(cells.join(" | "));
                }
                tables.push(table_rows.join("\n"));
            }
            _ => {}
        }
    }

    let mut full_text = paragraphs.join("\n\n");
    if !tables.is_empty() {
        full_text.push_str("\n\n--- Tabellen ---\n");
        full_text.push_str(&tables.join("\n\n"));
    }

    Ok(full_text)
}
