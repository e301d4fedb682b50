use futures::stream::{self, StreamExt};
use ingest::{Chunk, Chunker};
use models::{LengthBounds, Summarizer};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::report::Summary;

pub const SUMMARY_PLACEHOLDER: &str = "[Summary unavailable]";

/// Result of summarizing one chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    Summarized(String),
    Failed { reason: String },
}

impl ChunkOutcome {
    /// The text this chunk contributes to the stitched summary.
    pub fn into_text(self) -> String {
        match self {
            ChunkOutcome::Summarized(text) => text,
            ChunkOutcome::Failed { .. } => SUMMARY_PLACEHOLDER.to_string(),
        }
    }
}

pub struct SummaryOrchestrator {
    summarizer: Arc<dyn Summarizer>,
    chunker: Chunker,
    bounds: LengthBounds,
    max_concurrent_chunks: usize,
}

impl SummaryOrchestrator {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        chunker: Chunker,
        bounds: LengthBounds,
        max_concurrent_chunks: usize,
    ) -> Self {
        Self {
            summarizer,
            chunker,
            bounds,
            max_concurrent_chunks: max_concurrent_chunks.max(1),
        }
    }

    /// Summarize chunk by chunk and join the parts in chunk order.
    ///
    /// A failed chunk contributes the placeholder; it never fails the summary.
    pub async fn summarize(&self, text: &str) -> Summary {
        let chunks = self.chunker.chunk(text);
        debug!(chunks = chunks.len(), "Summarizing document");

        // futures are built up front so the stream holds no borrowing closure
        let pending: Vec<_> = chunks.iter().map(|chunk| self.summarize_chunk(chunk)).collect();

        // `buffered` yields in input order whatever the completion order
        let outcomes: Vec<ChunkOutcome> = stream::iter(pending)
            .buffered(self.max_concurrent_chunks)
            .collect()
            .await;

        let failed_chunks = outcomes
            .iter()
            .filter(|o| matches!(o, ChunkOutcome::Failed { .. }))
            .count();

        let parts: Vec<String> = outcomes.into_iter().map(ChunkOutcome::into_text).collect();

        Summary {
            text: parts.join(" "),
            chunks: chunks.len(),
            failed_chunks,
        }
    }

    async fn summarize_chunk(&self, chunk: &Chunk) -> ChunkOutcome {
        match self.summarizer.summarize(&chunk.text, self.bounds).await {
            Ok(summary) => ChunkOutcome::Summarized(summary),
            Err(e) => {
                warn!(
                    chunk = chunk.index,
                    chunk_id = %chunk.chunk_id,
                    error = %e,
                    "Summarization error"
                );
                ChunkOutcome::Failed {
                    reason: format!("{e:#}"),
                }
            }
        }
    }
}
