use ingest::Sentence;

/// Sentences containing `needle` verbatim (case-sensitive substring match).
pub fn sentences_mentioning(sentences: &[Sentence], needle: &str) -> Vec<String> {
    if needle.is_empty() {
        return Vec::new();
    }

    sentences
        .iter()
        .filter(|s| s.text.contains(needle))
        .map(|s| s.text.clone())
        .collect()
}

/// Sentences containing either the entity or the topic.
pub fn sentences_matching(
    sentences: &[Sentence],
    entity: Option<&str>,
    topic: Option<&str>,
) -> Vec<String> {
    let wanted = |needle: Option<&str>, text: &str| needle.is_some_and(|n| !n.is_empty() && text.contains(n));

    sentences
        .iter()
        .filter(|s| wanted(entity, &s.text) || wanted(topic, &s.text))
        .map(|s| s.text.clone())
        .collect()
}
