//! Text chunking with configurable size and overlap.
//!
//! Lengths are measured in characters. A chunk is cut at the last paragraph
//! break, line break or space in the second half of its window, falling back
//! to a hard cut. Neighbouring chunks always share at least `chunk_overlap`
//! characters. Windows holding nothing but whitespace produce no chunk.

use pdfqa_core::{AppError, AppResult};

/// Separators tried in order when looking for a cut point.
const SEPARATORS: [&[char]; 3] = [&['\n', '\n'], &['\n'], &[' ']];

/// A chunk of text with its char range in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub start_char: usize,
    pub end_char: usize,
    pub text: String,
}

/// Recursive-character style text splitter.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter; `chunk_overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config("chunk size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into overlapping spans.
    pub fn split(&self, text: &str) -> Vec<TextSpan> {
        let chars: Vec<char> = text.chars().collect();

        // Ignore leading and trailing whitespace entirely.
        let Some(mut start) = chars.iter().position(|c| !c.is_whitespace()) else {
            return Vec::new();
        };
        let len = chars
            .iter()
            .rposition(|c| !c.is_whitespace())
            .map_or(0, |i| i + 1);

        let mut spans = Vec::new();
        let mut prev_end = start;

        loop {
            let window_end = (start + self.chunk_size).min(len);
            let end = if window_end == len {
                len
            } else {
                self.find_cut(&chars, start, window_end, prev_end)
            };

            if chars[start..end].iter().any(|c| !c.is_whitespace()) {
                spans.push(TextSpan {
                    start_char: start,
                    end_char: end,
                    text: chars[start..end].iter().collect(),
                });
            }

            if end >= len {
                break;
            }

            prev_end = end;
            start = self.next_start(&chars, start, end);
        }

        tracing::trace!(
            "Split {} chars into {} chunks (size: {}, overlap: {})",
            len,
            spans.len(),
            self.chunk_size,
            self.chunk_overlap
        );

        spans
    }

    /// Pick the end of the chunk starting at `start`.
    ///
    /// The trimmed end must lie in the second half of the window, reach at
    /// least `prev_end` and leave the chunk longer than the overlap.
    fn find_cut(&self, chars: &[char], start: usize, window_end: usize, prev_end: usize) -> usize {
        let min_cut = start + self.chunk_size / 2;
        let acceptable = |end: usize| end > prev_end && end - start > self.chunk_overlap;

        for separator in SEPARATORS {
            let sep_len = separator.len();
            if window_end < start + sep_len {
                continue;
            }

            let mut i = window_end - sep_len;
            while i >= min_cut && i > start {
                if chars[i..i + sep_len] == *separator {
                    let end = trim_end(chars, start, i);
                    if acceptable(end) {
                        return end;
                    }
                }
                i -= 1;
            }
        }

        let hard = trim_end(chars, start, window_end);
        if acceptable(hard) {
            hard
        } else {
            window_end
        }
    }

    /// Start of the chunk following `[start, end)`.
    ///
    /// Begins at or before `end - chunk_overlap` and always after `start`.
    /// Backs up to the start of a word when one lies within a quarter window.
    fn next_start(&self, chars: &[char], start: usize, end: usize) -> usize {
        let floor = start + 1;
        let target = end.saturating_sub(self.chunk_overlap).max(floor);
        let limit = target.saturating_sub(self.chunk_size / 4).max(floor);

        let mut next = target;
        while next > limit && chars[next].is_whitespace() {
            next -= 1;
        }
        while next > limit && !chars[next - 1].is_whitespace() {
            next -= 1;
        }

        let word_start = !chars[next].is_whitespace() && chars[next - 1].is_whitespace();
        if word_start {
            next
        } else {
            target
        }
    }
}

/// Move `end` back over whitespace, never before `start`.
fn trim_end(chars: &[char], start: usize, mut end: usize) -> usize {
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    end
}
