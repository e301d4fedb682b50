use extract::{EntityMap, LabelAgreement};
use serde::Serialize;
use std::collections::BTreeMap;

/// Sentiment label -> number of sentences carrying it.
pub type SentimentTally = BTreeMap<String, usize>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub text: String,
    pub chunks: usize,
    pub failed_chunks: usize,
}

/// A sentence that mentions at least one person or organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEvent {
    pub sentence: String,
    pub entities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub summary: String,
    pub summary_chunks: usize,
    pub summary_failed_chunks: usize,
    pub entities: EntityMap,
    pub heuristic_entities: EntityMap,
    /// Model entities that the heuristic rules also found, per heuristic label.
    pub evaluation: EntityMap,
    pub evaluation_stats: BTreeMap<String, LabelAgreement>,
    pub topics: Vec<String>,
    pub key_events: Vec<KeyEvent>,
    pub sentiment_analysis: SentimentTally,
    pub relevant_contributions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadata {
    pub entities: EntityMap,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub entity: Option<String>,
    pub topic: Option<String>,
    pub summarize: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub filtered_sentences: Vec<String>,
    pub summary: Option<String>,
}
