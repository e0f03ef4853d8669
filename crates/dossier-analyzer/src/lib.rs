//! Dossier Analyzer - Per-document analysis
//!
//! Drives the inference backend for one document at a time: builds the
//! task prompt, obtains the completion, and parses it into a structured
//! analysis. Entity lists are normalized and deduplicated per document
//! before they leave this crate.

pub mod normalize;
pub mod parse;
pub mod prompt;

pub use normalize::{dedupe, normalize, NormalizedEntity};
pub use parse::{ParseOutcome, ParsedAnalysis};

use std::sync::Arc;

use dossier_core::{config::TokenBudgets, EntitySet, InferenceClient, Result};

/// Per-document analyzer
///
/// Shares its inference client read-only across concurrent analyses.
pub struct Analyzer {
    client: Arc<dyn InferenceClient>,
    budgets: TokenBudgets,
}

impl Analyzer {
    pub fn new(client: Arc<dyn InferenceClient>, budgets: TokenBudgets) -> Self {
        Self { client, budgets }
    }

    /// Model name of the underlying inference backend
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Run the combined analysis for one document's (truncated) text
    ///
    /// One completion carries category, relevance, summary and entity
    /// sections; the parser splits them apart. Entity lists come back
    /// deduplicated by canonical value, first display form winning.
    pub async fn analyze_document(&self, filename: &str, text: &str) -> Result<ParsedAnalysis> {
        let prompt = prompt::build_analysis_prompt(filename, text);
        let completion = self.client.generate(&prompt, self.budgets.analyze).await?;

        let mut parsed = parse::parse_analysis(&completion)?;
        parsed.analysis.entities = dedupe_entity_set(parsed.analysis.entities);

        tracing::debug!(
            filename,
            outcome = ?parsed.outcome,
            relevance = %parsed.relevance,
            entities = parsed.analysis.entities.len(),
            "document analyzed"
        );

        Ok(parsed)
    }

    /// Summarize a text
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let prompt = prompt::build_summarize_prompt(text);
        let completion = self.client.generate(&prompt, self.budgets.summarize).await?;
        Ok(completion.trim().to_string())
    }

    /// Classify a text into one category
    pub async fn classify(&self, text: &str) -> Result<String> {
        let prompt = prompt::build_classify_prompt(text);
        let completion = self.client.generate(&prompt, self.budgets.classify).await?;

        // The model is told to answer with the bare category name; keep
        // only the first non-empty line in case it elaborates anyway.
        let category = completion
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("Sonstiges")
            .to_string();

        Ok(category)
    }

    /// Extract entities from a text
    pub async fn extract_entities(&self, text: &str) -> Result<EntitySet> {
        let prompt = prompt::build_entity_prompt(text);
        let completion = self.client.generate(&prompt, self.budgets.entities).await?;
        Ok(dedupe_entity_set(parse::parse_entity_sections(&completion)))
    }

    /// Answer a question about a text
    pub async fn answer_question(&self, text: &str, question: &str) -> Result<String> {
        let prompt = prompt::build_question_prompt(text, question);
        let completion = self.client.generate(&prompt, self.budgets.question).await?;
        Ok(completion.trim().to_string())
    }
}

/// Collapse duplicate normalized entities within each list of one document
fn dedupe_entity_set(entities: EntitySet) -> EntitySet {
    let collapse = |list: Vec<String>| -> Vec<String> {
        dedupe(&list).into_iter().map(|n| n.display).collect()
    };

    EntitySet {
        companies: collapse(entities.companies),
        persons: collapse(entities.persons),
        amounts: collapse(entities.amounts),
        identifiers: collapse(entities.identifiers),
        dates: collapse(entities.dates),
        anomalies: collapse(entities.anomalies),
    }
}

// ============================================================================
// Tests
// ============================================================================
