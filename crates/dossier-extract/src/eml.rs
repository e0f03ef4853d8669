//! E-Mail (.eml) text extraction using mail-parser
//!
//! Produces a header block (sender, recipients, subject, date, attachment
//! names) followed by the plain-text body. Attachments themselves are not
//! extracted; their names are evidence enough for triage.

use mail_parser::{Addr, Address, MessageParser, MimeHeaders};

use dossier_core::{DossierError, Result};

/// Extract text from EML bytes
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let message = MessageParser::default()
        .parse(bytes)
        .ok_or_else(|| DossierError::ExtractionFailure("EML: not a parseable message".into()))?;

    let from = format_address(message.from());
    let to = format_address(message.to());
    let cc = format_address(message.cc());
    let subject = message.subject().unwrap_or("").to_string();
    let date = message.date().map(|d| d.to_string()).unwrap_or_default();

    let attachments: Vec<String> = message
        .attachments()
        .filter_map(|part| part.attachment_name())
        .map(|name| name.to_string())
        .collect();

    let body = message
        .body_text(0)
        .map(|b| b.into_owned())
        .unwrap_or_default();

    let header = format!(
        "Von: {from}\nAn: {to}\nCC: {cc}\nBetreff: {subject}\nDatum: {date}\nAnhänge: {}\n{}\n\n",
        if attachments.is_empty() {
            "Keine".to_string()
        } else {
            attachments.join(", ")
        },
        "=".repeat(50),
    );

    Ok(header + &body)
}

fn format_address(address: Option<&Address>) -> String {
    let Some(address) = address else {
        return String::new();
    };

    let mut parts = Vec::new();
    match address {
        Address::List(list) => {
            for addr in list {
                parts.push(format_addr(addr));
            }
        }
        Address::Group(groups) => {
            for group in groups {
                for addr in &group.addresses {
                    parts.push(format_addr(addr));
                }
            }
        }
    }

    parts.join(", ")
}

fn format_addr(addr: &Addr) -> String {
    match (&addr.name, &addr.address) {
        (Some(name), Some(email)) => format!("{name} <{email}>"),
        (None, Some(email)) => email.to_string(),
        (Some(name), None) => name.to_string(),
        (None, None) => String::new(),
    }
}
