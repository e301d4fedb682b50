/// Trim a mention and collapse internal whitespace runs to single spaces.
///
/// Case and punctuation are kept: entity sets deduplicate on exact text.
pub fn normalize_mention(text: &str) -> Option<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
