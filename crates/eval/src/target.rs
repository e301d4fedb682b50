use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// A service under test: one prompt in, one textual response out.
#[async_trait]
pub trait PromptTarget: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<String>;
}

/// POSTs `{"<prompt_field>": prompt}` and reads `<response_field>` from the
/// JSON reply.
pub struct HttpPromptTarget {
    endpoint: String,
    prompt_field: String,
    response_field: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPromptTarget {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self {
            endpoint,
            prompt_field: "prompt".to_string(),
            response_field: "response".to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn with_fields(mut self, prompt_field: String, response_field: String) -> Self {
        self.prompt_field = prompt_field;
        self.response_field = response_field;
        self
    }
}

#[async_trait]
impl PromptTarget for HttpPromptTarget {
    async fn send(&self, prompt: &str) -> Result<String> {
        let mut body = serde_json::Map::new();
        body.insert(self.prompt_field.clone(), json!(prompt));

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.endpoint))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("Target error ({}): {}", status, text);
        }

        let value: Value = response
            .json()
            .await
            .context("Target response is not JSON")?;
        debug!(endpoint = %self.endpoint, "Received response");

        extract_field(&value, &self.response_field)
    }
}

/// Strings are taken as-is; any other JSON value is compared in its
/// serialized form.
fn extract_field(value: &Value, field: &str) -> Result<String> {
    match value.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => bail!("Target response has no '{}' field", field),
    }
}
