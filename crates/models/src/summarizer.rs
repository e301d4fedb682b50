use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ollama::{GenerateOptions, OllamaClient};
use crate::prompt;
use crate::traits::{LengthBounds, Summarizer};

pub struct OllamaSummarizer {
    llm_client: OllamaClient,
}

impl OllamaSummarizer {
    pub fn new(llm_client: OllamaClient) -> Self {
        Self { llm_client }
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, text: &str, bounds: LengthBounds) -> Result<String> {
        let prompt = prompt::build_summary_prompt(text, bounds);
        let options = GenerateOptions {
            num_predict: Some(bounds.max),
            ..GenerateOptions::deterministic()
        };

        let summary_text = self
            .llm_client
            .generate(&prompt, options)
            .await
            .context("Failed to generate summary")?;

        let summary = summary_text.trim();
        if summary.is_empty() {
            anyhow::bail!("Summarizer returned an empty summary");
        }

        Ok(summary.to_string())
    }
}
