use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prompt;
use crate::retry::RetryPolicy;

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
    policy: RetryPolicy,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>, // "json" for structured output
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

/// Sampling options forwarded to the model server.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerateOptions {
    /// Greedy decoding, the equivalent of `do_sample=False`.
    pub fn deterministic() -> Self {
        Self {
            num_predict: None,
            temperature: Some(0.0),
        }
    }
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String> {
        self.policy
            .retry("ollama_generate", || self.send(prompt, None, options))
            .await
    }

    /// Generate and parse a JSON payload, asking the model to repair its
    /// output once when it does not parse.
    pub async fn generate_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T> {
        let options = GenerateOptions::deterministic();
        let response = self
            .policy
            .retry("ollama_generate_json", || {
                self.send(prompt, Some("json"), options)
            })
            .await?;

        match serde_json::from_str::<T>(&response) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                debug!(error = %e, "Model returned invalid JSON, asking for a correction");
                let retry_prompt = prompt::build_retry_prompt(&response);
                let corrected = self
                    .policy
                    .retry("ollama_generate_json", || {
                        self.send(&retry_prompt, Some("json"), options)
                    })
                    .await?;
                serde_json::from_str(&corrected).context("Failed to get valid JSON after correction")
            }
        }
    }

    /// Check that the model server answers.
    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.policy.attempt_timeout())
            .send()
            .await
            .context("Failed to reach Ollama")?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama health check failed: {}", response.status());
        }
        Ok(())
    }

    async fn send(
        &self,
        prompt: &str,
        format: Option<&str>,
        options: GenerateOptions,
    ) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            format,
            options: Some(options),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama request failed: {}", response.status());
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(ollama_response.response)
    }
}
