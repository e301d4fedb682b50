pub mod embeddings;
pub mod ollama;
pub mod prompt;
pub mod retry;
pub mod sentiment;
pub mod summarizer;
pub mod tagger;
pub mod traits;

pub use embeddings::EmbeddingClient;
pub use ollama::{GenerateOptions, OllamaClient};
pub use retry::RetryPolicy;
pub use sentiment::OllamaSentiment;
pub use summarizer::OllamaSummarizer;
pub use tagger::OllamaTagger;
pub use traits::{
    Embedder, EntityTagger, LengthBounds, Sentiment, SentimentClassifier, Summarizer, TaggedEntity,
};
