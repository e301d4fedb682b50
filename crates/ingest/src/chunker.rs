use crate::chunk::Chunk;
use crate::segment::{PunctuationSegmenter, Sentence, SentenceSegmenter};

#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    /// Upper bound on a chunk's length in characters. A single sentence
    /// longer than this still becomes its own chunk.
    pub max_chunk_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 1000,
        }
    }
}

pub struct Chunker {
    config: ChunkerConfig,
    segmenter: PunctuationSegmenter,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self {
            config,
            segmenter: PunctuationSegmenter,
        }
    }

    pub fn with_max_chars(max_chunk_chars: usize) -> Self {
        Self::new(ChunkerConfig { max_chunk_chars })
    }

    /// Greedily pack consecutive sentences into chunks of bounded length.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let sentences = self.segmenter.segment(text);
        self.pack(&sentences)
    }

    fn pack(&self, sentences: &[Sentence]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut buffer = Buffer::default();

        for sentence in sentences {
            let sentence_chars = sentence.text.chars().count();

            // If adding this sentence exceeds max, flush buffer
            if !buffer.is_empty() && buffer.chars + 1 + sentence_chars > self.config.max_chunk_chars {
                chunks.push(buffer.flush(chunks.len()));
            }

            buffer.push(sentence, sentence_chars);
        }

        // Flush remaining buffer
        if !buffer.is_empty() {
            chunks.push(buffer.flush(chunks.len()));
        }

        chunks
    }
}

#[derive(Default)]
struct Buffer {
    text: String,
    chars: usize,
    sentences: usize,
    start: usize,
    end: usize,
}

impl Buffer {
    fn is_empty(&self) -> bool {
        self.sentences == 0
    }

    fn push(&mut self, sentence: &Sentence, sentence_chars: usize) {
        if self.is_empty() {
            self.start = sentence.start;
        } else {
            self.text.push(' ');
            self.chars += 1;
        }
        self.text.push_str(&sentence.text);
        self.chars += sentence_chars;
        self.sentences += 1;
        self.end = sentence.end;
    }

    fn flush(&mut self, index: usize) -> Chunk {
        let taken = std::mem::take(self);
        Chunk::new(index, taken.text, taken.sentences, (taken.start, taken.end))
    }
}
