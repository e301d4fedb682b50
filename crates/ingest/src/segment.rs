use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A sentence and its byte span `[start, end)` in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Sentence {
    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

pub trait SentenceSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<Sentence>;
}

/// Ends a sentence at `.`, `!` or `?` followed by whitespace.
///
/// This is the rule the chunker relies on: joining the output with single
/// spaces gives back the trimmed text with whitespace runs at sentence
/// boundaries collapsed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PunctuationSegmenter;

impl SentenceSegmenter for PunctuationSegmenter {
    fn segment(&self, text: &str) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        let mut start: Option<usize> = None;
        let mut prev_terminal = false;
        let mut end = 0;

        for (idx, ch) in text.char_indices() {
            if ch.is_whitespace() {
                if prev_terminal {
                    if let Some(s) = start.take() {
                        sentences.push(Sentence {
                            text: text[s..end].to_string(),
                            start: s,
                            end,
                        });
                    }
                }
                prev_terminal = false;
                continue;
            }

            if start.is_none() {
                start = Some(idx);
            }
            end = idx + ch.len_utf8();
            prev_terminal = matches!(ch, '.' | '!' | '?');
        }

        if let Some(s) = start {
            sentences.push(Sentence {
                text: text[s..end].to_string(),
                start: s,
                end,
            });
        }

        sentences
    }
}

/// Unicode (UAX #29) sentence boundaries, trimmed of surrounding whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSegmenter;

impl SentenceSegmenter for UnicodeSegmenter {
    fn segment(&self, text: &str) -> Vec<Sentence> {
        text.split_sentence_bound_indices()
            .filter_map(|(offset, raw)| {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let lead = raw.len() - raw.trim_start().len();
                let start = offset + lead;
                Some(Sentence {
                    text: trimmed.to_string(),
                    start,
                    end: start + trimmed.len(),
                })
            })
            .collect()
    }
}
