//! TF-IDF keyword ranking where each sentence is one document of the corpus.

use regex::Regex;
use std::collections::{BTreeMap, HashSet};

use crate::stopwords::ENGLISH_STOP_WORDS;

pub struct TopicExtractor {
    token: Regex,
    any_word: Regex,
    stopwords: HashSet<&'static str>,
    top_n: usize,
}

impl TopicExtractor {
    pub fn new(top_n: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            token: Regex::new(r"\b\w\w+\b")?,
            any_word: Regex::new(r"\w+")?,
            stopwords: ENGLISH_STOP_WORDS.iter().copied().collect(),
            top_n,
        })
    }

    /// Rank terms by summed TF-IDF weight, highest first.
    ///
    /// Ties keep vocabulary (alphabetical) order. With fewer than two
    /// sentences IDF carries no signal, so raw term counts are ranked
    /// instead. Text made only of stop words or one-letter words is ranked
    /// over all of its words, so only text without words yields no topics.
    pub fn extract(&self, sentences: &[&str]) -> Vec<String> {
        let mut docs: Vec<Vec<String>> = sentences.iter().map(|s| self.tokenize(s)).collect();
        if docs.iter().all(Vec::is_empty) {
            docs = sentences.iter().map(|s| self.all_words(s)).collect();
        }

        let scores = if docs.len() < 2 {
            term_counts(&docs)
        } else {
            tfidf_column_sums(&docs)
        };

        let mut ranked: Vec<(String, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.top_n);

        ranked.into_iter().map(|(term, _score)| term).collect()
    }

    /// Lower-cased runs of two or more word characters, stop words removed.
    fn tokenize(&self, sentence: &str) -> Vec<String> {
        let lowered = sentence.to_lowercase();
        self.token
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|word| !self.stopwords.contains(*word))
            .map(str::to_string)
            .collect()
    }

    fn all_words(&self, sentence: &str) -> Vec<String> {
        let lowered = sentence.to_lowercase();
        self.any_word
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

fn term_counts(docs: &[Vec<String>]) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for term in docs.iter().flatten() {
        *counts.entry(term.clone()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Smoothed IDF `ln((1 + n) / (1 + df)) + 1`, raw counts as TF, each row
/// L2-normalised, then summed per term.
fn tfidf_column_sums(docs: &[Vec<String>]) -> BTreeMap<String, f64> {
    let n = docs.len() as f64;

    let rows: Vec<BTreeMap<&str, f64>> = docs
        .iter()
        .map(|doc| {
            let mut tf = BTreeMap::new();
            for term in doc {
                *tf.entry(term.as_str()).or_insert(0.0) += 1.0;
            }
            tf
        })
        .collect();

    let mut document_frequencies: BTreeMap<&str, f64> = BTreeMap::new();
    for row in &rows {
        for term in row.keys() {
            *document_frequencies.entry(*term).or_insert(0.0) += 1.0;
        }
    }

    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for row in rows {
        let weighted: Vec<(&str, f64)> = row
            .into_iter()
            .map(|(term, tf)| {
                let df = document_frequencies[term];
                let idf = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
                (term, tf * idf)
            })
            .collect();

        let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            continue;
        }

        for (term, weight) in weighted {
            *sums.entry(term.to_string()).or_insert(0.0) += weight / norm;
        }
    }

    sums
}
