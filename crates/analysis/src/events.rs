use extract::{ORG, PERSON};
use ingest::Sentence;
use models::TaggedEntity;

use crate::report::KeyEvent;

/// Pick out sentences that mention a person or organization.
///
/// Mentions come from one tagging pass over the whole document and are
/// assigned to the sentence containing their span start, so offsets from the
/// tagger and the segmenter stay consistent. Events follow sentence order;
/// entities within an event keep first-mention order without duplicates.
pub fn key_events(sentences: &[Sentence], mentions: &[TaggedEntity]) -> Vec<KeyEvent> {
    let mut per_sentence: Vec<Vec<String>> = vec![Vec::new(); sentences.len()];

    let mut ordered: Vec<&TaggedEntity> = mentions
        .iter()
        .filter(|m| m.label == PERSON || m.label == ORG)
        .collect();
    ordered.sort_by_key(|m| m.span);

    for mention in ordered {
        let Some(index) = sentence_index(sentences, mention.span.0) else {
            continue;
        };
        let entities = &mut per_sentence[index];
        if !entities.contains(&mention.text) {
            entities.push(mention.text.clone());
        }
    }

    sentences
        .iter()
        .zip(per_sentence)
        .filter(|(_, entities)| !entities.is_empty())
        .map(|(sentence, entities)| KeyEvent {
            sentence: sentence.text.clone(),
            entities,
        })
        .collect()
}

fn sentence_index(sentences: &[Sentence], offset: usize) -> Option<usize> {
    // sentences are sorted and disjoint
    let candidate = sentences.partition_point(|s| s.end <= offset);
    sentences
        .get(candidate)
        .filter(|s| s.contains_offset(offset))
        .map(|_| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest::{SentenceSegmenter, UnicodeSegmenter};

    fn tag(text: &str, needle: &str, label: &str) -> Vec<TaggedEntity> {
        text.match_indices(needle)
            .map(|(start, m)| TaggedEntity {
                text: m.to_string(),
                label: label.to_string(),
                span: (start, start + m.len()),
            })
            .collect()
    }

    #[test]
    fn test_events_in_sentence_order() {
        let text = "The meeting opened. Jane Doe presented the budget. Acme Corp objected and Jane Doe replied. \
                    Minutes were approved on Friday.";
        let sentences = UnicodeSegmenter.segment(text);
        let mut mentions = tag(text, "Acme Corp", ORG);
        mentions.extend(tag(text, "Jane Doe", PERSON));
        mentions.extend(tag(text, "Friday", "DATE"));

        let events = key_events(&sentences, &mentions);

        assert_eq!(
            events,
            vec![
                KeyEvent {
                    sentence: "Jane Doe presented the budget.".to_string(),
                    entities: vec!["Jane Doe".to_string()],
                },
                KeyEvent {
                    sentence: "Acme Corp objected and Jane Doe replied.".to_string(),
                    entities: vec!["Acme Corp".to_string(), "Jane Doe".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_no_person_or_org_means_no_events() {
        let text = "Nothing notable. It rained on Monday.";
        let sentences = UnicodeSegmenter.segment(text);
        let mentions = tag(text, "Monday", "DATE");

        assert!(key_events(&sentences, &mentions).is_empty());
    }

    #[test]
    fn test_mentions_outside_sentences_are_skipped() {
        let text = "Jane spoke.";
        let sentences = UnicodeSegmenter.segment(text);
        let stray = vec![TaggedEntity {
            text: "Ghost".to_string(),
            label: PERSON.to_string(),
            span: (500, 505),
        }];

        assert!(key_events(&sentences, &stray).is_empty());
    }
}
