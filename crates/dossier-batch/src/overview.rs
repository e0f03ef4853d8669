//! Narrative batch overview
//!
//! A short German synthesis over the whole batch: counts, category and
//! relevance distribution, and the most heavily cross-referenced entities.
//! Pure string assembly over already-aggregated data.

use std::collections::BTreeMap;

use dossier_core::{AnalysisRecord, CrossReferenceIndex, Relevance};

/// Build the report overview from the finished records and correlations
pub fn build_overview(records: &[AnalysisRecord], index: &CrossReferenceIndex) -> String {
    let total = records.len();
    let processed = records.iter().filter(|r| r.success).count();
    let failed = total - processed;

    let mut parts = vec![format!(
        "{total} {} eingereicht, {processed} erfolgreich analysiert, {failed} fehlgeschlagen.",
        plural(total, "Dokument", "Dokumente")
    )];

    if processed == 0 {
        parts.push("Keine Analyseergebnisse verfügbar.".to_string());
        return parts.join(" ");
    }

    if let Some(categories) = category_distribution(records) {
        parts.push(format!("Kategorien: {categories}."));
    }

    parts.push(format!("Relevanz: {}.", relevance_distribution(records)));

    let top = top_cross_references(index, 3);
    if top.is_empty() {
        if processed > 1 {
            parts.push("Keine dokumentübergreifenden Übereinstimmungen gefunden.".to_string());
        }
    } else {
        parts.push(format!("Dokumentübergreifende Treffer: {}.", top.join(", ")));
    }

    parts.join(" ")
}

fn category_distribution(records: &[AnalysisRecord]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records.iter().filter(|r| r.success) {
        if let Some(analysis) = &record.analysis {
            if !analysis.category.is_empty() {
                *counts.entry(analysis.category.as_str()).or_default() += 1;
            }
        }
    }

    if counts.is_empty() {
        return None;
    }

    let mut entries: Vec<(&str, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    Some(
        entries
            .into_iter()
            .map(|(category, count)| format!("{category} ({count})"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn relevance_distribution(records: &[AnalysisRecord]) -> String {
    let count_of = |relevance: Relevance| {
        records
            .iter()
            .filter(|r| r.relevance == Some(relevance))
            .count()
    };

    let mut parts = Vec::new();
    for relevance in [Relevance::Hoch, Relevance::Mittel, Relevance::Gering] {
        let count = count_of(relevance);
        if count > 0 {
            parts.push(format!("{count}x {relevance}"));
        }
    }

    if parts.is_empty() {
        "keine Einstufung".to_string()
    } else {
        parts.join(", ")
    }
}

fn top_cross_references(index: &CrossReferenceIndex, limit: usize) -> Vec<String> {
    let mut all: Vec<(usize, &str, &str)> = Vec::new();

    for entry in &index.companies {
        all.push((entry.document_ids.len(), entry.display.as_str(), "Firma"));
    }
    for entry in &index.persons {
        all.push((entry.document_ids.len(), entry.display.as_str(), "Person"));
    }
    for entry in &index.amounts {
        all.push((entry.document_ids.len(), entry.display.as_str(), "Betrag"));
    }

    all.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

    all.into_iter()
        .take(limit)
        .map(|(count, display, type_label)| {
            format!(
                "'{display}' ({type_label}, {count} {})",
                plural(count, "Dokument", "Dokumente")
            )
        })
        .collect()
}

fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

// ============================================================================
// Tests
// ============================================================================
