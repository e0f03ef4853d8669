//! Dossier API - REST surface for the batch document-intelligence pipeline
//!
//! Thin HTTP framing over the core crates: no analysis logic lives here.
//! Routes mirror the operations investigators actually use:
//! - `GET  /health` - service and backend status
//! - `POST /api/summarize` / `/api/classify` / `/api/extract-entities` /
//!   `/api/question` - single-text operations
//! - `POST /api/analyze` - multipart batch upload, returns the batch report

pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Body limit for batch uploads: several files of up to 32 MiB each plus
/// multipart overhead. The per-file limit is enforced by the format gate.
const MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = if state.config.server.cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<axum::http::HeaderValue> = state
            .config
            .server
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/summarize", post(handlers::text::summarize))
        .route("/api/classify", post(handlers::text::classify))
        .route("/api/extract-entities", post(handlers::text::extract_entities))
        .route("/api/question", post(handlers::text::question))
        .route("/api/analyze", post(handlers::upload::analyze_batch))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Test utilities
// ============================================================================

#[cfg(feature = "test-utils")]
pub mod test_utils {
    //! Router construction against a canned inference backend, for
    //! integration tests that must not depend on a running model server.

    use std::sync::Arc;

    use async_trait::async_trait;
    use dossier_core::{AppConfig, InferenceClient, Result};

    use crate::state::AppState;

    /// Inference stub returning one well-formed analysis completion
    pub struct CannedClient;

    #[async_trait]
    impl InferenceClient for CannedClient {
        async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
            // The classify prompt asks for a bare category name
            if prompt.starts_with("Klassifiziere") {
                return Ok("Rechnung".to_string());
            }
            if prompt.starts_with("Fasse") {
                return Ok("Eine Rechnung der ABC GmbH über 12.500 EUR.".to_string());
            }
            if prompt.starts_with("Beantworte") {
                return Ok("Information nicht im Text gefunden.".to_string());
            }

            Ok("KATEGORIE: Rechnung\nRELEVANZ: hoch\nZUSAMMENFASSUNG:\nEine Rechnung der ABC GmbH.\n\
                FIRMEN: ABC GmbH\nPERSONEN: keine\nGELDBETRAEGE: 12.500 EUR\nDATEN: keine\n\
                IBANS: keine\nSTEUERNUMMERN: keine\nAUFFAELLIGKEITEN: keine"
                .to_string())
        }

        fn model(&self) -> &str {
            "canned-model"
        }
    }

    /// Build a router wired to the canned backend
    pub fn create_router_for_testing() -> axum::Router {
        let state = AppState::with_client(AppConfig::default(), Arc::new(CannedClient));
        crate::create_router(Arc::new(state))
    }
}

#[cfg(feature = "test-utils")]
pub use test_utils::create_router_for_testing;
