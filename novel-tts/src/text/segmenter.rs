//! Punctuation-driven segmentation of narrative text.
//!
//! The text is cut at every configured boundary character, keeping the character
//! as its own token. Tokens that carry readable content (a digit, a CJK ideograph
//! or a Latin letter) open a new segment; pure punctuation tokens attach to the
//! segment before them, so a closing quote stays with its sentence.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Segment;
use crate::error::{PipelineError, Result};

/// Tokens matching this start a new segment.
static BREAK_POINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d|[\x{4E00}-\x{9FFF}]|[a-zA-Z]").expect("break-point pattern is valid")
});

/// Splits text into [`Segment`]s at a configured set of boundary characters.
#[derive(Debug, Clone)]
pub struct Segmenter {
    boundary: Regex,
}

impl Segmenter {
    /// Build a segmenter from the boundary punctuation set.
    ///
    /// Every character is taken literally. An empty set is a configuration error.
    pub fn new(punctuation: &str) -> Result<Self> {
        if punctuation.is_empty() {
            return Err(PipelineError::MissingPunctuation);
        }

        let pattern = format!("[{}]", regex::escape(punctuation));
        let boundary = Regex::new(&pattern).map_err(|e| PipelineError::InvalidPunctuation {
            punctuation: punctuation.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { boundary })
    }

    /// Split `text` into ordered segments with dense 0-based ids.
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        let text: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();

        let mut pieces: Vec<String> = Vec::new();
        // Punctuation seen before the first readable token
        let mut pending = String::new();

        for token in self.tokens(&text) {
            if token.trim().is_empty() {
                continue;
            }

            if BREAK_POINT.is_match(token) {
                let mut piece = std::mem::take(&mut pending);
                piece.push_str(token);
                pieces.push(piece);
            } else if let Some(last) = pieces.last_mut() {
                last.push_str(token);
            } else {
                pending.push_str(token);
            }
        }

        if !pending.is_empty() {
            pieces.push(pending);
        }

        pieces
            .into_iter()
            .enumerate()
            .map(|(segment_id, content)| Segment::new(segment_id, content))
            .collect()
    }

    /// Split on boundary characters, keeping each boundary as its own token.
    fn tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut tokens = Vec::new();
        let mut last = 0;

        for m in self.boundary.find_iter(text) {
            tokens.push(&text[last..m.start()]);
            tokens.push(m.as_str());
            last = m.end();
        }
        tokens.push(&text[last..]);

        tokens
    }
}
