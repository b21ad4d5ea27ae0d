//! Paragraph segmentation with sentence-aware splitting
//!
//! Lines are accumulated into blocks until a blank line or the minimum
//! length is reached. Blocks longer than the maximum are cut at the last
//! sentence terminator inside the limit, or hard-cut when there is none.

use std::str::Lines;

use serde::{Deserialize, Serialize};

use super::passage::{Document, Passage};
use crate::domain::DomainError;

pub const DEFAULT_MIN_PARAGRAPH_LENGTH: usize = 500;
pub const DEFAULT_MAX_PARAGRAPH_LENGTH: usize = 500;

/// Longest capitalised token treated as an abbreviation before a '.'
const MAX_ABBREVIATION_LEN: usize = 3;

const TERMINATORS: &[char] = &['.', '。', '!', '?', '！', '？'];

/// Segmentation limits, measured in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmenter {
    pub min_paragraph_length: usize,
    pub max_paragraph_length: usize,
}

impl Segmenter {
    pub fn new(min_paragraph_length: usize, max_paragraph_length: usize) -> Result<Self, DomainError> {
        let segmenter = Self {
            min_paragraph_length,
            max_paragraph_length,
        };
        segmenter.validate()?;
        Ok(segmenter)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_paragraph_length == 0 {
            return Err(DomainError::validation(
                "max_paragraph_length must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Lazily segment raw text; the returned iterator can be cloned to restart
    pub fn segment<'a>(&self, text: &'a str) -> Segments<'a> {
        Segments {
            lines: text.lines(),
            block: String::new(),
            block_chars: 0,
            remainder: None,
            min: self.min_paragraph_length,
            max: self.max_paragraph_length.max(1),
        }
    }

    /// Segment a document into passages owned by it
    pub fn passages(self, document: &Document) -> impl Iterator<Item = Passage> + Clone + '_ {
        let source = document.name.as_str();
        self.segment(&document.content)
            .map(move |text| Passage::new(text, source))
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            min_paragraph_length: DEFAULT_MIN_PARAGRAPH_LENGTH,
            max_paragraph_length: DEFAULT_MAX_PARAGRAPH_LENGTH,
        }
    }
}

/// Lazy paragraph sequence produced by [`Segmenter::segment`]
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    lines: Lines<'a>,
    block: String,
    block_chars: usize,
    remainder: Option<String>,
    min: usize,
    max: usize,
}

impl Segments<'_> {
    /// Add a line to the open block; returns the block when it should be flushed
    fn push_line(&mut self, line: &str) -> Option<String> {
        let trimmed = line.trim();

        if !trimmed.is_empty() {
            if !self.block.is_empty() {
                self.block.push('\n');
                self.block_chars += 1;
            }
            self.block.push_str(trimmed);
            self.block_chars += trimmed.chars().count();
        }

        let flush = trimmed.is_empty() || self.block_chars >= self.min;
        if flush && !self.block.is_empty() {
            return Some(self.take_block());
        }
        None
    }

    fn take_block(&mut self) -> String {
        self.block_chars = 0;
        std::mem::take(&mut self.block)
    }
}

impl Iterator for Segments<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(pending) = self.remainder.take() {
                let (head, tail) = cut_once(&pending, self.max);
                if !tail.is_empty() {
                    self.remainder = Some(tail);
                }
                if !head.is_empty() {
                    return Some(head);
                }
                continue;
            }

            match self.lines.next() {
                Some(line) => {
                    if let Some(block) = self.push_line(line) {
                        self.remainder = Some(block);
                    }
                }
                None if self.block.is_empty() => return None,
                None => {
                    let block = self.take_block();
                    self.remainder = Some(block);
                }
            }
        }
    }
}

/// Split off the first passage of `text`; the tail is strictly shorter than the input
fn cut_once(text: &str, max: usize) -> (String, String) {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return (text.trim().to_string(), String::new());
    }

    let split_at = match last_sentence_end(&chars, max) {
        Some(end) => end + 1,
        None => max,
    };

    let head: String = chars[..split_at].iter().collect();
    let tail: String = chars[split_at..].iter().collect();

    (head.trim().to_string(), tail.trim().to_string())
}

/// Index of the last sentence terminator that keeps the head within `max` chars
fn last_sentence_end(chars: &[char], max: usize) -> Option<usize> {
    let upper = max.min(chars.len());
    (0..upper).rev().find(|&i| is_sentence_end(chars, i))
}

/// Whether `chars[i]` ends a sentence
///
/// A period after a short alphabetic token that follows whitespace only counts
/// as an abbreviation when the token is capitalised ("Mr.", "Dr."). Lowercase
/// short words such as "cat." still end the sentence, otherwise ordinary
/// sentence endings would never be cut points.
fn is_sentence_end(chars: &[char], i: usize) -> bool {
    let c = chars[i];
    if !TERMINATORS.contains(&c) {
        return false;
    }
    if c != '.' {
        return true;
    }

    // Decimal point: "3.14"
    let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
    let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
    if prev_digit && next_digit {
        return false;
    }

    // Abbreviation: a short capitalised word after whitespace, e.g. " Mr."
    let mut start = i;
    while start > 0 && chars[start - 1].is_ascii_alphabetic() {
        start -= 1;
    }
    let token_len = i - start;
    let after_space = start == 0 || chars[start - 1].is_whitespace();

    !(token_len > 0
        && token_len <= MAX_ABBREVIATION_LEN
        && after_space
        && chars[start].is_ascii_uppercase())
}
