use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Operations timed separately.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    Summarize,
    Entities,
    Topics,
    Sentiment,
    Analyze,
    Metadata,
    Query,
}

#[derive(Default)]
struct OperationTimer {
    calls: AtomicUsize,
    total_time_us: AtomicU64,
}

impl OperationTimer {
    fn record(&self, duration: Duration) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.total_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    fn avg_time_ms(&self) -> f64 {
        let total = self.total_time_us.load(Ordering::Relaxed) as f64;
        let cnt = self.calls.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Default)]
pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing
    summarize: OperationTimer,
    entities: OperationTimer,
    topics: OperationTimer,
    sentiment: OperationTimer,
    analyze: OperationTimer,
    metadata: OperationTimer,
    query: OperationTimer,

    // Counts
    documents_analyzed: AtomicUsize,
    chunks_summarized: AtomicUsize,
    chunk_failures: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record(&self, operation: Operation, duration: Duration) {
        self.timer(operation).record(duration);
    }

    pub fn record_documents(&self, count: usize) {
        self.documents_analyzed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_summary(&self, chunks: usize, failed: usize) {
        self.chunks_summarized.fetch_add(chunks, Ordering::Relaxed);
        self.chunk_failures.fetch_add(failed, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_summarize_time_ms: self.summarize.avg_time_ms(),
            avg_entities_time_ms: self.entities.avg_time_ms(),
            avg_topics_time_ms: self.topics.avg_time_ms(),
            avg_sentiment_time_ms: self.sentiment.avg_time_ms(),
            avg_analyze_time_ms: self.analyze.avg_time_ms(),
            avg_metadata_time_ms: self.metadata.avg_time_ms(),
            avg_query_time_ms: self.query.avg_time_ms(),
            documents_analyzed: self.documents_analyzed.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            chunk_failures: self.chunk_failures.load(Ordering::Relaxed),
        }
    }

    fn timer(&self, operation: Operation) -> &OperationTimer {
        match operation {
            Operation::Summarize => &self.summarize,
            Operation::Entities => &self.entities,
            Operation::Topics => &self.topics,
            Operation::Sentiment => &self.sentiment,
            Operation::Analyze => &self.analyze,
            Operation::Metadata => &self.metadata,
            Operation::Query => &self.query,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub avg_summarize_time_ms: f64,
    pub avg_entities_time_ms: f64,
    pub avg_topics_time_ms: f64,
    pub avg_sentiment_time_ms: f64,
    pub avg_analyze_time_ms: f64,
    pub avg_metadata_time_ms: f64,
    pub avg_query_time_ms: f64,
    pub documents_analyzed: usize,
    pub chunks_summarized: usize,
    pub chunk_failures: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
