//! Single-text analysis handlers
//!
//! The standalone operations investigators use for ad-hoc checks: summary,
//! classification, entity extraction and question answering over a pasted
//! text. Each truncates its input to the configured analysis bound before
//! prompting.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use dossier_core::EntitySet;
use dossier_extract::truncate_text;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub text: String,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub original_length: usize,
    pub summary: String,
    pub truncated: bool,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub category: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct EntityResponse {
    pub entities: EntitySet,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: String,
    pub answer: String,
    pub model: String,
}

/// Summarize a text
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let original_length = request.text.chars().count();
    let bounded = non_empty(request.text, state.max_text_chars())?;

    let summary = state.analyzer.summarize(&bounded.text).await?;

    Ok(Json(SummarizeResponse {
        original_length,
        summary,
        truncated: bounded.truncated,
        model: state.analyzer.model().to_string(),
    }))
}

/// Classify a text into one category
pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let bounded = non_empty(request.text, state.max_text_chars())?;

    let category = state.analyzer.classify(&bounded.text).await?;

    Ok(Json(ClassifyResponse {
        category,
        model: state.analyzer.model().to_string(),
    }))
}

/// Extract entities from a text
pub async fn extract_entities(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let bounded = non_empty(request.text, state.max_text_chars())?;

    let entities = state.analyzer.extract_entities(&bounded.text).await?;

    Ok(Json(EntityResponse {
        entities,
        model: state.analyzer.model().to_string(),
    }))
}

/// Answer a question about a text
pub async fn question(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    if request.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".to_string()));
    }
    let bounded = non_empty(request.text, state.max_text_chars())?;

    let answer = state
        .analyzer
        .answer_question(&bounded.text, &request.question)
        .await?;

    Ok(Json(QuestionResponse {
        question: request.question,
        answer,
        model: state.analyzer.model().to_string(),
    }))
}

fn non_empty(
    text: String,
    max_chars: usize,
) -> Result<dossier_core::ExtractedText, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }
    Ok(truncate_text(text, max_chars))
}
