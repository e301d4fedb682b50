pub mod config;
pub mod events;
pub mod filter;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod stopwords;
pub mod summarize;
pub mod topics;

pub use config::{AnalysisConfig, SummarizationConfig, TopicConfig};
pub use events::key_events;
pub use filter::{sentences_matching, sentences_mentioning};
pub use pipeline::{Analyzer, Collaborators};
pub use report::{
    AnalysisReport, DocumentMetadata, KeyEvent, QueryOptions, QueryResult, SentimentTally, Summary,
};
pub use sentiment::SentimentAggregator;
pub use summarize::{ChunkOutcome, SUMMARY_PLACEHOLDER, SummaryOrchestrator};
pub use topics::TopicExtractor;
