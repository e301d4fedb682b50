pub mod consistency;
pub mod similarity;
pub mod target;

pub use consistency::{ConsistencyConfig, ConsistencyEvaluator, ConsistencyReport, SimilarityScore, score_similarities};
pub use similarity::{cosine_similarity, pairwise_similarities};
pub use target::{HttpPromptTarget, PromptTarget};
