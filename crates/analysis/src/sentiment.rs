use anyhow::{Context, Result};
use ingest::Sentence;
use models::SentimentClassifier;
use std::sync::Arc;

use crate::report::SentimentTally;

pub struct SentimentAggregator {
    classifier: Arc<dyn SentimentClassifier>,
}

impl SentimentAggregator {
    pub fn new(classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self { classifier }
    }

    /// Classify every sentence and count labels. Confidence is discarded.
    ///
    /// Any classifier failure fails the whole tally.
    pub async fn tally(&self, sentences: &[Sentence]) -> Result<SentimentTally> {
        let mut counts = SentimentTally::new();

        for (index, sentence) in sentences.iter().enumerate() {
            let sentiment = self
                .classifier
                .classify(&sentence.text)
                .await
                .with_context(|| format!("Sentiment classification failed for sentence {}", index))?;

            *counts.entry(sentiment.label).or_insert(0) += 1;
        }

        Ok(counts)
    }
}
