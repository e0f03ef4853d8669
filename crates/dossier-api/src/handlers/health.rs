//! Health check handler

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use dossier_core::InferenceProvider;
use dossier_extract::SUPPORTED_EXTENSIONS;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub model: String,
    pub backend_status: &'static str,
    pub supported_formats: Vec<&'static str>,
    pub uptime_secs: u64,
}

/// Report service health and inference backend reachability
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.increment_requests();

    let backend_status = match state.config.llm.provider {
        InferenceProvider::Ollama => {
            let url = format!("{}/api/tags", state.config.llm.ollama_url);
            match state.http.get(&url).send().await {
                Ok(response) if response.status().is_success() => "online",
                _ => "offline",
            }
        }
        // No cheap unauthenticated probe for hosted backends
        InferenceProvider::OpenAI => "unknown",
    };

    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        model: state.analyzer.model().to_string(),
        backend_status,
        supported_formats: SUPPORTED_EXTENSIONS.to_vec(),
        uptime_secs: state.uptime_secs(),
    })
}
