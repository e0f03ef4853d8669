//! Dossier Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults for development. The `DOSSIER_ENV` variable
//! switches between the development profile (small local model) and the
//! production profile (large model on the analysis VM), mirroring how the
//! deployment actually runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Inference backend configuration
    pub llm: LlmConfig,

    /// Batch pipeline configuration
    pub batch: BatchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = std::env::var("DOSSIER_ENV")
            .unwrap_or_default()
            .parse::<Environment>()
            .unwrap_or(Environment::Development);

        let mut config = Self {
            llm: LlmConfig::for_environment(environment),
            ..Self::default()
        };

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "API_PORT".to_string(),
                value: port,
            })?;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Inference backend
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider.parse()?;
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.llm.ollama_url = url;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.openai_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(timeout) = std::env::var("LLM_TIMEOUT_SECS") {
            config.llm.timeout_secs =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "LLM_TIMEOUT_SECS".to_string(),
                    value: timeout,
                })?;
        }

        // Batch pipeline
        if let Ok(parallel) = std::env::var("BATCH_MAX_PARALLEL") {
            config.batch.max_parallel =
                parallel.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "BATCH_MAX_PARALLEL".to_string(),
                    value: parallel,
                })?;
        }
        if let Ok(deadline) = std::env::var("BATCH_DEADLINE_SECS") {
            config.batch.deadline_secs =
                deadline.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "BATCH_DEADLINE_SECS".to_string(),
                    value: deadline,
                })?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "development" | "" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue {
                key: "DOSSIER_ENV".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed origins for CORS. Empty means permissive (the report UI is
    /// served from varying intranet hosts).
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec![],
        }
    }
}

/// Supported inference providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceProvider {
    Ollama,
    OpenAI,
}

impl std::str::FromStr for InferenceProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            _ => Err(ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Inference backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Inference provider to use
    pub provider: InferenceProvider,

    /// Ollama server URL
    pub ollama_url: String,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for compatible APIs)
    pub openai_base_url: Option<String>,

    /// Model name to use
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Per-task completion token budgets
    pub budgets: TokenBudgets,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

impl LlmConfig {
    /// Environment-specific defaults: small local model on a laptop,
    /// large model on the GPU VM.
    pub fn for_environment(env: Environment) -> Self {
        let model = match env {
            Environment::Development => "llama3.2:3b",
            Environment::Production => "llama3.1:70b",
        };

        Self {
            provider: InferenceProvider::Ollama,
            ollama_url: "http://localhost:11434".to_string(),
            openai_api_key: None,
            openai_base_url: None,
            model: model.to_string(),
            timeout_secs: 120,
            budgets: TokenBudgets::default(),
        }
    }
}

/// Completion token budgets per task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBudgets {
    pub summarize: u32,
    pub classify: u32,
    pub question: u32,
    pub entities: u32,
    pub analyze: u32,
}

impl Default for TokenBudgets {
    fn default() -> Self {
        Self {
            summarize: 500,
            classify: 50,
            question: 300,
            entities: 800,
            analyze: 1500,
        }
    }
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum admitted file size in bytes
    pub max_file_size: u64,

    /// Maximum analyzed text length in characters
    pub max_text_chars: usize,

    /// Maximum number of files analyzed concurrently. The inference backend
    /// is a shared single-instance service; excess concurrency queues here
    /// instead of flooding it.
    pub max_parallel: usize,

    /// Overall batch deadline in seconds
    pub deadline_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_file_size: 32 * 1024 * 1024,
            max_text_chars: 6000,
            max_parallel: 2,
            deadline_secs: 300,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
