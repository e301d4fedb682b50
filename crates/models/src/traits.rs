//! Contracts for the model-backed collaborators the pipeline consumes.
//!
//! Components receive these as `Arc<dyn Trait>` at construction so tests can
//! substitute deterministic stubs.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One entity mention with its byte span `[start, end)` in the tagged text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntity {
    pub text: String,
    pub label: String,
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub confidence: f32,
}

/// Output length bounds handed to the summarizer, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

#[async_trait]
pub trait EntityTagger: Send + Sync {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedEntity>>;
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, sentence: &str) -> Result<Sentiment>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, bounds: LengthBounds) -> Result<String>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
