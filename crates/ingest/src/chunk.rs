use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub chunk_id: String,
    pub text: String,
    pub sentence_count: usize,
    pub offset: (usize, usize), // [start, end) byte positions in the source
}

impl Chunk {
    pub fn new(index: usize, text: String, sentence_count: usize, offset: (usize, usize)) -> Self {
        // Generate stable chunk_id from content
        let chunk_id = Self::generate_chunk_id(index, &text);

        Self {
            index,
            chunk_id,
            text,
            sentence_count,
            offset,
        }
    }

    fn generate_chunk_id(index: usize, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(index.to_string().as_bytes());
        hasher.update(text.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16]) // Use first 16 bytes (32 hex chars)
    }

    /// Length in characters, the unit the chunk bound is expressed in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
