use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub summarization: SummarizationConfig,
    pub topics: TopicConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationConfig {
    /// Upper bound on each chunk summary, in tokens.
    pub max_length: usize,
    pub min_length: usize,
    /// Chunk bound in characters.
    pub chunk_size: usize,
    pub max_concurrent_chunks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub top_n: usize,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            max_length: 130,
            min_length: 30,
            chunk_size: 1000,
            max_concurrent_chunks: 3,
        }
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self { top_n: 5 }
    }
}
