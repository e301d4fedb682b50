//! Repeated-prompt consistency scoring.
//!
//! The same prompt is sent `retries` times, one request at a time. Every
//! response is embedded and compared with every other one; the run is
//! consistent when the mean pairwise cosine similarity reaches the threshold.

use anyhow::{Context, Result, anyhow, bail};
use models::Embedder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::similarity::pairwise_similarities;
use crate::target::PromptTarget;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    pub retries: usize,
    pub similarity_threshold: f64,
    /// Bound on each request and each embedding call.
    pub request_timeout: Duration,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            retries: 5,
            similarity_threshold: 0.95,
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub average_similarity: f64,
    pub consistent: bool,
    pub min: f64,
    pub median: f64,
    pub max: f64,
    /// Sample standard deviation, absent with a single pair.
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyReport {
    #[serde(flatten)]
    pub score: SimilarityScore,
    pub threshold: f64,
    pub num_responses: usize,
    pub num_pairs: usize,
    pub responses: Vec<String>,
    pub similarities: Vec<f64>,
}

/// Score a set of pairwise similarities against a threshold.
pub fn score_similarities(similarities: &[f64], threshold: f64) -> Result<SimilarityScore> {
    if similarities.is_empty() {
        bail!("At least one response pair is required");
    }

    let average_similarity = statistical::mean(similarities);
    let std_dev = if similarities.len() >= 2 {
        Some(statistical::standard_deviation(similarities, Some(average_similarity)))
    } else {
        None
    };

    Ok(SimilarityScore {
        average_similarity,
        consistent: average_similarity >= threshold,
        min: similarities.iter().copied().fold(f64::INFINITY, f64::min),
        median: statistical::median(similarities),
        max: similarities.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        std_dev,
    })
}

pub struct ConsistencyEvaluator {
    target: Arc<dyn PromptTarget>,
    embedder: Arc<dyn Embedder>,
    config: ConsistencyConfig,
}

impl ConsistencyEvaluator {
    pub fn new(
        target: Arc<dyn PromptTarget>,
        embedder: Arc<dyn Embedder>,
        config: ConsistencyConfig,
    ) -> Self {
        Self {
            target,
            embedder,
            config,
        }
    }

    /// Any failed request or embedding aborts the run.
    pub async fn evaluate(&self, prompt: &str) -> Result<ConsistencyReport> {
        let retries = self.config.retries;
        if retries < 2 {
            bail!("Consistency needs at least 2 retries, got {}", retries);
        }

        let mut responses = Vec::with_capacity(retries);
        for attempt in 1..=retries {
            let response = self
                .bounded("Request", self.target.send(prompt))
                .await
                .with_context(|| format!("Request {}/{} failed", attempt, retries))?;
            debug!(attempt, chars = response.chars().count(), "Collected response");
            responses.push(response);
        }

        let mut embeddings = Vec::with_capacity(retries);
        for (index, response) in responses.iter().enumerate() {
            let embedding = self
                .bounded("Embedding", self.embedder.embed(response))
                .await
                .with_context(|| format!("Embedding response {} failed", index + 1))?;
            embeddings.push(embedding);
        }

        let similarities = pairwise_similarities(&embeddings)?;
        let score = score_similarities(&similarities, self.config.similarity_threshold)?;

        info!(
            retries,
            average_similarity = score.average_similarity,
            consistent = score.consistent,
            "Consistency run complete"
        );

        Ok(ConsistencyReport {
            score,
            threshold: self.config.similarity_threshold,
            num_responses: responses.len(),
            num_pairs: similarities.len(),
            responses,
            similarities,
        })
    }

    async fn bounded<T>(
        &self,
        what: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let limit = self.config.request_timeout;
        timeout(limit, call)
            .await
            .map_err(|_| anyhow!("{} timed out after {} ms", what, limit.as_millis()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns the scripted responses in order, failing past the end.
    struct ScriptedTarget {
        responses: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedTarget {
        fn new(responses: Vec<&'static str>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PromptTarget for ScriptedTarget {
        async fn send(&self, _prompt: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(n)
                .map(|s| s.to_string())
                .ok_or_else(|| anyhow!("service unavailable"))
        }
    }

    /// Word-length histogram, enough to tell similar texts from different ones.
    struct HistogramEmbedder;

    #[async_trait]
    impl Embedder for HistogramEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0; 8];
            for word in text.split_whitespace() {
                v[word.len().min(7)] += 1.0;
            }
            Ok(v)
        }
    }

    struct SlowTarget;

    #[async_trait]
    impl PromptTarget for SlowTarget {
        async fn send(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    fn config(retries: usize) -> ConsistencyConfig {
        ConsistencyConfig {
            retries,
            similarity_threshold: 0.95,
            request_timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_near_identical_responses_are_consistent() {
        let score = score_similarities(&[0.97, 0.96, 0.98], 0.95).unwrap();

        assert!((score.average_similarity - 0.97).abs() < 1e-9);
        assert!(score.consistent);
        assert_eq!(score.min, 0.96);
        assert_eq!(score.median, 0.97);
        assert_eq!(score.max, 0.98);
        assert!((score.std_dev.unwrap() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(score_similarities(&[0.9, 0.9], 0.9).unwrap().consistent);
        assert!(!score_similarities(&[0.9, 0.8], 0.9).unwrap().consistent);
        assert_eq!(score_similarities(&[0.5], 0.9).unwrap().std_dev, None);
        assert!(score_similarities(&[], 0.9).is_err());
    }

    #[tokio::test]
    async fn test_single_retry_is_rejected_before_any_request() {
        let target = Arc::new(ScriptedTarget::new(vec!["a", "b"]));
        let evaluator =
            ConsistencyEvaluator::new(target.clone(), Arc::new(HistogramEmbedder), config(1));

        assert!(evaluator.evaluate("Summarize").await.is_err());
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_identical_responses() {
        let target = Arc::new(ScriptedTarget::new(vec!["The budget passed."; 4]));
        let evaluator = ConsistencyEvaluator::new(target, Arc::new(HistogramEmbedder), config(4));

        let report = evaluator.evaluate("Summarize").await.unwrap();

        assert_eq!(report.num_responses, 4);
        assert_eq!(report.num_pairs, 6);
        assert!((report.score.average_similarity - 1.0).abs() < 1e-9);
        assert!(report.score.consistent);
    }

    #[tokio::test]
    async fn test_divergent_responses_are_flagged() {
        let target = Arc::new(ScriptedTarget::new(vec![
            "The budget passed.",
            "Extraordinarily contentious deliberations postponed everything indefinitely",
            "ok",
        ]));
        let evaluator = ConsistencyEvaluator::new(target, Arc::new(HistogramEmbedder), config(3));

        let report = evaluator.evaluate("Summarize").await.unwrap();

        assert_eq!(report.similarities.len(), 3);
        assert!(!report.score.consistent);
        assert!(report.score.average_similarity <= 1.0);
    }

    #[tokio::test]
    async fn test_failed_request_aborts_the_run() {
        let target = Arc::new(ScriptedTarget::new(vec!["only one"]));
        let evaluator = ConsistencyEvaluator::new(target, Arc::new(HistogramEmbedder), config(3));

        let err = evaluator.evaluate("Summarize").await.unwrap_err();
        assert!(format!("{err:#}").contains("Request 2/3 failed"));
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let evaluator =
            ConsistencyEvaluator::new(Arc::new(SlowTarget), Arc::new(HistogramEmbedder), config(2));

        let err = evaluator.evaluate("Summarize").await.unwrap_err();
        assert!(format!("{err:#}").contains("timed out"));
    }
}
