//! Application state management

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dossier_analyzer::Analyzer;
use dossier_batch::BatchProcessor;
use dossier_core::{AppConfig, InferenceClient, Result};
use dossier_extract::DocumentExtractor;
use dossier_llm::create_inference_client;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Per-document analyzer
    pub analyzer: Arc<Analyzer>,
    /// Batch processor
    pub processor: BatchProcessor,
    /// Plain HTTP client for backend health probes
    pub http: reqwest::Client,
}

impl AppState {
    /// Create application state, wiring the configured inference backend
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = create_inference_client(&config.llm)?;
        Ok(Self::with_client(config, client))
    }

    /// Create application state around an existing inference client
    pub fn with_client(config: AppConfig, client: Arc<dyn InferenceClient>) -> Self {
        let analyzer = Arc::new(Analyzer::new(client, config.llm.budgets.clone()));
        let processor = BatchProcessor::new(
            Arc::new(DocumentExtractor::new()),
            analyzer.clone(),
            config.batch.clone(),
        );

        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            analyzer,
            processor,
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Maximum analyzed text length in characters
    pub fn max_text_chars(&self) -> usize {
        self.config.batch.max_text_chars
    }
}
