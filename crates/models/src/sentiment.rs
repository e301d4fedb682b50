use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::ollama::OllamaClient;
use crate::prompt;
use crate::traits::{Sentiment, SentimentClassifier};

pub struct OllamaSentiment {
    llm_client: OllamaClient,
}

#[derive(Debug, Deserialize)]
struct SentimentOutput {
    label: String,
    #[serde(default)]
    confidence: f32,
}

impl OllamaSentiment {
    pub fn new(llm_client: OllamaClient) -> Self {
        Self { llm_client }
    }
}

#[async_trait]
impl SentimentClassifier for OllamaSentiment {
    async fn classify(&self, sentence: &str) -> Result<Sentiment> {
        let prompt = prompt::build_sentiment_prompt(sentence);

        let output: SentimentOutput = self
            .llm_client
            .generate_json(&prompt)
            .await
            .context("Failed to classify sentiment")?;

        to_sentiment(output)
    }
}

fn to_sentiment(output: SentimentOutput) -> Result<Sentiment> {
    let label = output.label.trim().to_uppercase();
    if label.is_empty() {
        anyhow::bail!("Sentiment classifier returned an empty label");
    }

    Ok(Sentiment {
        label,
        confidence: output.confidence.clamp(0.0, 1.0),
    })
}
