//! Overlapping fixed-size text chunker.
//!
//! Splits page text into [`Chunk`]s of at most `chunk_size` characters,
//! with `overlap` characters carried from the end of each chunk into
//! the start of the next so context spanning a split point is not lost.
//! A split lands on the last separator (line break by default) inside
//! the target window when one exists; otherwise it falls back to the
//! raw character boundary.
//!
//! Pages are chunked independently: a page shorter than the target
//! yields exactly one chunk, and chunks never cross a page boundary.

use crate::config::ChunkingConfig;
use crate::loader::Page;

use serde::{Deserialize, Serialize};

/// A contiguous span of document text; the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based page the span came from.
    pub page: usize,
    /// Global insertion order across the whole document.
    pub index: usize,
    pub text: String,
}

/// Splits pages into overlapping chunks. Cheap to construct; splitting
/// the same pages twice yields the same chunks.
#[derive(Debug, Clone)]
pub struct Splitter {
    chunk_size: usize,
    overlap: usize,
    separator: char,
}

impl Splitter {
    pub fn new(config: &ChunkingConfig) -> Self {
        // Config validation rejects overlap >= chunk_size; clamp anyway
        // so a hand-built config cannot stall the walk below.
        let chunk_size = config.chunk_size.max(1);
        Self {
            chunk_size,
            overlap: config.overlap.min(chunk_size - 1),
            separator: config.separator,
        }
    }

    /// Lazily split `pages` into chunks with contiguous indices starting
    /// at 0. Whitespace-only pages yield nothing. Calling this again on
    /// the same input restarts the sequence from the beginning.
    pub fn split_pages<'a>(&'a self, pages: &'a [Page]) -> impl Iterator<Item = Chunk> + 'a {
        pages
            .iter()
            .filter(|page| !page.text.trim().is_empty())
            .flat_map(move |page| {
                self.split_text(&page.text)
                    .into_iter()
                    .map(move |text| (page.number, text))
            })
            .enumerate()
            .map(|(index, (page, text))| Chunk { page, index, text })
    }

    /// Split one page's text into overlapping windows.
    fn split_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut pieces = Vec::new();
        let mut start = 0usize;

        while start < chars.len() {
            let hard_end = (start + self.chunk_size).min(chars.len());
            let end = if hard_end < chars.len() {
                // Prefer the last separator inside the window; the
                // separator stays with the chunk it terminates.
                chars[start..hard_end]
                    .iter()
                    .rposition(|&c| c == self.separator)
                    .map(|pos| start + pos + 1)
                    .unwrap_or(hard_end)
            } else {
                hard_end
            };

            pieces.push(chars[start..end].iter().collect());

            if end == chars.len() {
                break;
            }
            // Step back by the overlap, but always make forward progress.
            start = if end > start + self.overlap {
                end - self.overlap
            } else {
                end
            };
        }

        pieces
    }
}
