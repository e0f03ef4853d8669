//! Cross-document entity correlation
//!
//! A classic map-reduce shape, kept as an explicit two-phase fold so the
//! aggregation stays pure and independently testable: map each document's
//! entities to canonical keys, reduce by key across the batch, then filter
//! by cardinality. Only entities shared by at least two documents are
//! reported.

use std::collections::{BTreeMap, BTreeSet};

use dossier_analyzer::normalize;
use dossier_core::{AnalysisRecord, CrossReference, CrossReferenceIndex, EntitySet};

/// Correlate entities across all successful records of a batch
pub fn build_cross_references(records: &[AnalysisRecord]) -> CrossReferenceIndex {
    CrossReferenceIndex {
        companies: correlate(records, |e| &e.companies),
        persons: correlate(records, |e| &e.persons),
        amounts: correlate(records, |e| &e.amounts),
    }
}

fn correlate<F>(records: &[AnalysisRecord], select: F) -> Vec<CrossReference>
where
    F: Fn(&EntitySet) -> &Vec<String>,
{
    // Map phase: canonical value -> (display form, ids of documents citing it)
    let mut by_key: BTreeMap<String, (String, BTreeSet<usize>)> = BTreeMap::new();

    for record in records.iter().filter(|r| r.success) {
        let Some(analysis) = &record.analysis else {
            continue;
        };

        for raw in select(&analysis.entities) {
            let normalized = normalize(raw);
            if normalized.canonical.is_empty() {
                continue;
            }

            by_key
                .entry(normalized.canonical)
                .or_insert_with(|| (normalized.display, BTreeSet::new()))
                .1
                .insert(record.document_id);
        }
    }

    // Reduce phase: keep entities linked to >= 2 documents, ordered by
    // descending link count, then canonical value.
    let mut references: Vec<CrossReference> = by_key
        .into_iter()
        .filter(|(_, (_, ids))| ids.len() >= 2)
        .map(|(value, (display, ids))| CrossReference {
            value,
            display,
            document_ids: ids.into_iter().collect(),
        })
        .collect();

    references.sort_by(|a, b| {
        b.document_ids
            .len()
            .cmp(&a.document_ids.len())
            .then_with(|| a.value.cmp(&b.value))
    });

    references
}

// ============================================================================
// Tests
// ============================================================================
