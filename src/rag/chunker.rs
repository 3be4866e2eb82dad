//! Corpus segmentation.
//!
//! The corpus is split into paragraphs: any run of two or more line breaks
//! (blank lines, possibly holding stray spaces or tabs) separates chunks.
//! Each paragraph is trimmed and empty ones are dropped. Optionally, long
//! paragraphs are further cut into overlapping character windows.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// A newline, any whitespace (including more newlines), then a newline.
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*\n").expect("paragraph break pattern is valid")
});

/// One retrievable unit of corpus text.
///
/// `id` is the chunk's position in the corpus sequence and doubles as the
/// vector id in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
}

/// Split `text` into trimmed, non-empty paragraphs, in corpus order.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextChunker {
    /// 0 disables capping.
    max_chunk_chars: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Paragraph chunking with windows of at most `max_chunk_chars`
    /// characters, neighbors sharing `chunk_overlap` characters.
    ///
    /// The overlap is clamped below the window size so windows always advance.
    pub fn new(max_chunk_chars: usize, chunk_overlap: usize) -> Self {
        Self {
            max_chunk_chars,
            chunk_overlap: chunk_overlap.min(max_chunk_chars.saturating_sub(1)),
        }
    }

    /// Plain paragraph chunking, no size cap.
    pub fn paragraphs() -> Self {
        Self::default()
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        split_paragraphs(text)
            .into_iter()
            .flat_map(|paragraph| self.windows(paragraph))
            .enumerate()
            .map(|(id, text)| Chunk { id, text })
            .collect()
    }

    fn windows(&self, paragraph: &str) -> Vec<String> {
        let char_count = paragraph.chars().count();
        if self.max_chunk_chars == 0 || char_count <= self.max_chunk_chars {
            return vec![paragraph.to_string()];
        }

        // Byte offset of every char boundary, plus the end of the string
        let bounds: Vec<usize> = paragraph
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(paragraph.len()))
            .collect();

        let step = self.max_chunk_chars - self.chunk_overlap;
        let mut windows = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.max_chunk_chars).min(char_count);
            let window = paragraph[bounds[start]..bounds[end]].trim();
            if !window.is_empty() {
                windows.push(window.to_string());
            }
            if end == char_count {
                break;
            }
            start += step;
        }

        windows
    }
}
