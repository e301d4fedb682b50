use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::ollama::OllamaClient;
use crate::prompt;
use crate::traits::{EntityTagger, TaggedEntity};

/// NER through an instruction-following model.
///
/// The model lists distinct entities; spans are recovered by locating every
/// whole-word occurrence of each entity in the source text.
pub struct OllamaTagger {
    llm_client: OllamaClient,
}

#[derive(Debug, Deserialize)]
struct TaggerOutput {
    #[serde(default)]
    entities: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    text: String,
    label: String,
}

impl OllamaTagger {
    pub fn new(llm_client: OllamaClient) -> Self {
        Self { llm_client }
    }
}

#[async_trait]
impl EntityTagger for OllamaTagger {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedEntity>> {
        let prompt = prompt::build_entity_prompt(text);

        let output: TaggerOutput = self
            .llm_client
            .generate_json(&prompt)
            .await
            .context("Failed to extract entities")?;

        Ok(locate_mentions(text, output.entities))
    }
}

fn locate_mentions(text: &str, entities: Vec<RawEntity>) -> Vec<TaggedEntity> {
    let distinct: BTreeSet<(String, String)> = entities
        .into_iter()
        .map(|e| (e.text.trim().to_string(), e.label.trim().to_uppercase()))
        .filter(|(t, l)| !t.is_empty() && !l.is_empty())
        .collect();

    let mut mentions = Vec::new();
    for (entity_text, label) in distinct {
        let before = mentions.len();
        for (start, matched) in text.match_indices(entity_text.as_str()) {
            let end = start + matched.len();
            if is_word_boundary(text, start, end) {
                mentions.push(TaggedEntity {
                    text: entity_text.clone(),
                    label: label.clone(),
                    span: (start, end),
                });
            }
        }
        if mentions.len() == before {
            debug!(entity = %entity_text, label = %label, "Tagged entity not found in text, dropping");
        }
    }

    mentions.sort_by(|a, b| a.span.cmp(&b.span).then_with(|| a.label.cmp(&b.label)));
    mentions
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
