use analysis::{AnalysisConfig, SummarizationConfig, TopicConfig};
use anyhow::{Context, Result};
use models::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const CONFIG_ENV: &str = "MINUTES_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelConfig,
    pub summarization: SummarizationConfig,
    pub topics: TopicConfig,
    pub concurrency: ConcurrencyConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub ollama_url: String,
    pub generation_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            generation_model: "llama3".to_string(),
        }
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10000,
        }
    }
}

impl AppConfig {
    /// Load from `$MINUTES_CONFIG`, or `config.yaml` in the working directory.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_path(Path::new(&path))
    }

    /// A missing file means defaults; a malformed one is an error.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(raw)?)
    }

    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            summarization: self.summarization.clone(),
            topics: self.topics.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_retries,
            self.retry.initial_backoff_ms,
            self.retry.max_backoff_ms,
        )
        .with_timeout(Duration::from_secs(self.concurrency.request_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            "summarization:\n  max_length: 200\n  chunk_size: 500\nserver:\n  log_format: json\n",
        )
        .unwrap();

        assert_eq!(config.summarization.max_length, 200);
        assert_eq!(config.summarization.chunk_size, 500);
        assert_eq!(config.summarization.min_length, 30);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.topics.top_n, 5);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::from_path(Path::new("/nonexistent/minutes.yaml")).unwrap();
        assert_eq!(config.models.generation_model, "llama3");
        assert_eq!(config.retry_policy().attempt_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_shipped_config_sets_every_model_key() {
        let config = AppConfig::from_yaml(include_str!("../../../config.yaml")).unwrap();
        assert_eq!(config.models.ollama_url, "http://localhost:11434");

        let shipped: serde_yaml_ng::Value =
            serde_yaml_ng::from_str(include_str!("../../../config.yaml")).unwrap();
        let known = serde_yaml_ng::to_value(&config.models).unwrap();
        let keys = |v: &serde_yaml_ng::Value| {
            let mut keys: Vec<String> = v
                .as_mapping()
                .unwrap()
                .keys()
                .map(|k| k.as_str().unwrap().to_string())
                .collect();
            keys.sort();
            keys
        };
        assert_eq!(keys(&shipped["models"]), keys(&known));
        assert_eq!(keys(&known), vec!["generation_model", "ollama_url"]);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(AppConfig::from_yaml("summarization: [not, a, map]").is_err());
    }
}
