pub mod chunk;
pub mod chunker;
pub mod reader;
pub mod segment;

pub use chunk::Chunk;
pub use chunker::{Chunker, ChunkerConfig};
pub use reader::{Document, InputError};
pub use segment::{PunctuationSegmenter, Sentence, SentenceSegmenter, UnicodeSegmenter};
