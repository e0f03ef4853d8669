//! Entity normalization for cross-document matching
//!
//! Two raw strings that normalize to the same canonical value are the same
//! entity for correlation purposes. The rule: trim, collapse every Unicode
//! whitespace run (non-breaking spaces included) to one ASCII space, and
//! case-fold. The display form keeps the original casing.

use std::sync::OnceLock;

use regex::Regex;

/// A normalized entity: correlation key plus presentable form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEntity {
    /// Canonical value used as the correlation key
    pub canonical: String,

    /// Whitespace-normalized form preserving the original casing
    pub display: String,
}

fn whitespace_re() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Normalize a raw extracted entity string
pub fn normalize(raw: &str) -> NormalizedEntity {
    let display = whitespace_re().replace_all(raw.trim(), " ").into_owned();
    let canonical = display.to_lowercase();

    NormalizedEntity { canonical, display }
}

/// Collapse duplicate entities within one document
///
/// Order-preserving; the first display form encountered wins.
pub fn dedupe(raw_entities: &[String]) -> Vec<NormalizedEntity> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();

    for raw in raw_entities {
        let normalized = normalize(raw);
        if normalized.canonical.is_empty() {
            continue;
        }
        if seen.insert(normalized.canonical.clone()) {
            result.push(normalized);
        }
    }

    result
}
