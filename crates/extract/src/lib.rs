pub mod fusion;
pub mod heuristic;
pub mod normalizer;
pub mod schema;

pub use fusion::{LabelAgreement, agreement_stats, fuse};
pub use heuristic::HeuristicExtractor;
pub use schema::{DATE, EntityMap, ORG, PERSON};

use anyhow::{Context, Result};
use models::{EntityTagger, TaggedEntity};
use std::sync::Arc;
use tracing::debug;

/// Statistical entity extraction backed by the injected NER tagger.
pub struct EntityExtractor {
    tagger: Arc<dyn EntityTagger>,
}

impl EntityExtractor {
    pub fn new(tagger: Arc<dyn EntityTagger>) -> Self {
        Self { tagger }
    }

    /// Raw mentions with spans, in text order.
    pub async fn mentions(&self, text: &str) -> Result<Vec<TaggedEntity>> {
        let mentions = self
            .tagger
            .tag(text)
            .await
            .context("Named-entity tagging failed")?;

        debug!(mentions = mentions.len(), "Tagged document");
        Ok(mentions)
    }

    pub async fn extract(&self, text: &str) -> Result<EntityMap> {
        let mentions = self.mentions(text).await?;
        Ok(group_mentions(&mentions))
    }
}

/// Group mentions into label -> distinct texts.
pub fn group_mentions(mentions: &[TaggedEntity]) -> EntityMap {
    let mut entities = EntityMap::new();
    for mention in mentions {
        entities.insert(&mention.label, &mention.text);
    }
    entities
}
