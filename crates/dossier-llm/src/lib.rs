//! Dossier LLM - Inference service clients
//!
//! Provides the `InferenceClient` implementations the pipeline talks to:
//! - Ollama (`/api/generate`, non-streaming) for the on-premise deployment
//! - An OpenAI-compatible chat client for hosted backends
//!
//! Every request is bounded by the configured timeout; an elapsed timeout
//! surfaces as `DossierError::InferenceTimeout` so the orchestrator can
//! record it per file without aborting the batch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use dossier_core::{DossierError, InferenceClient, InferenceProvider, LlmConfig, Result};

// ============================================================================
// Ollama Client
// ============================================================================

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DossierError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(
            config.ollama_url.clone(),
            config.model.clone(),
            config.timeout_secs,
        )
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                num_predict: max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            return Err(DossierError::InferenceError(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| DossierError::InferenceError(format!("invalid Ollama response: {e}")))?;

        Ok(result.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// OpenAI-compatible Client
// ============================================================================

/// OpenAI chat-completions client (also serves compatible APIs)
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

impl OpenAiClient {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DossierError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
        })
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| DossierError::Config("OpenAI API key required".to_string()))?;

        let mut client = Self::new(api_key.clone(), config.model.clone(), config.timeout_secs)?;
        if let Some(url) = &config.openai_base_url {
            client.base_url = url.clone();
        }

        Ok(client)
    }

    /// Set custom base URL (for compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl InferenceClient for OpenAiClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DossierError::InferenceError(format!(
                "OpenAI error: {error_text}"
            )));
        }

        let result: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| DossierError::InferenceError(format!("invalid OpenAI response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DossierError::InferenceError("no completion generated".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an inference client from config
pub fn create_inference_client(config: &LlmConfig) -> Result<Arc<dyn InferenceClient>> {
    match config.provider {
        InferenceProvider::Ollama => Ok(Arc::new(OllamaClient::from_config(config)?)),
        InferenceProvider::OpenAI => Ok(Arc::new(OpenAiClient::from_config(config)?)),
    }
}

/// Map transport errors onto the pipeline taxonomy
fn map_request_error(err: reqwest::Error) -> DossierError {
    if err.is_timeout() {
        DossierError::InferenceTimeout
    } else if err.is_connect() {
        DossierError::InferenceError(format!("connection failed: {err}"))
    } else {
        DossierError::InferenceError(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new("http://localhost:11434", "llama3.2:3b", 120).unwrap();
        assert_eq!(client.model(), "llama3.2:3b");
    }

    #[test]
    fn test_openai_requires_api_key() {
        let config = LlmConfig {
            provider: InferenceProvider::OpenAI,
            ..LlmConfig::default()
        };
        assert!(OpenAiClient::from_config(&config).is_err());
    }

    #[test]
    fn test_factory_selects_provider() {
        let config = LlmConfig::default();
        let client = create_inference_client(&config).unwrap();
        assert_eq!(client.model(), "llama3.2:3b");
    }
}
