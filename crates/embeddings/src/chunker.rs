/// A window of consecutive words cut from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub index: usize,
    pub content: String,
    /// Word offsets into the source document, end exclusive.
    pub first_word: usize,
    pub end_word: usize,
}

#[derive(Debug, Clone)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub overlap_size: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap_size: 100,
        }
    }
}

/// Splits text into overlapping word windows.
pub struct TextChunker {
    config: ChunkConfig,
}

impl TextChunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    fn step(&self) -> usize {
        let size = self.config.chunk_size.max(1);
        // An overlap at least as large as the window would never advance.
        size.saturating_sub(self.config.overlap_size).max(1)
    }

    pub fn chunk_text(&self, text: &str) -> Vec<TextChunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return vec![];
        }

        let size = self.config.chunk_size.max(1);
        let step = self.step();
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + size).min(words.len());
            chunks.push(TextChunk {
                index: chunks.len(),
                content: words[start..end].join(" "),
                first_word: start,
                end_word: end,
            });
            if end == words.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}
