//! Text chunking (§4.C): splits long text into overlapping windows so each
//! chunk gets its own embedding while the whole-file vector still exists
//! for fast first-hit retrieval (§9).

use text_splitter::{ChunkConfig, Characters, TextSplitter};

#[derive(Clone, Debug)]
pub struct TextChunk {
    pub chunk_index: usize,
    pub text: String,
}

pub struct TextChunker {
    splitter: TextSplitter<Characters>,
    chunk_size: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(overlap)
            .expect("overlap must not exceed chunk_size");
        Self {
            splitter: TextSplitter::new(config),
            chunk_size,
        }
    }

    /// Whether `text` needs chunking at all (§4.C: only texts longer than
    /// `chunk_size` produce `embeddings_chunks`).
    pub fn needs_chunking(&self, text: &str) -> bool {
        text.chars().count() > self.chunk_size
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        self.splitter
            .chunks(text)
            .enumerate()
            .map(|(chunk_index, chunk)| TextChunk { chunk_index, text: chunk.to_string() })
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(512, 64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_does_not_need_chunking() {
        let chunker = TextChunker::default();
        assert!(!chunker.needs_chunking("a short sentence"));
    }

    #[test]
    fn long_text_is_split_into_contiguous_chunks() {
        let chunker = TextChunker::default();
        let long_text = "word ".repeat(400);
        assert!(chunker.needs_chunking(&long_text));
        let chunks = chunker.chunk(&long_text);
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }
}
