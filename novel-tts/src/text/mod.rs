//! Text processing: splitting narrative prose into utterance segments.

pub mod segmenter;

pub use segmenter::Segmenter;

use serde::{Deserialize, Serialize};

/// An utterance-sized slice of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in reading order, dense and 0-based
    pub segment_id: usize,
    /// Never empty or whitespace-only
    pub content: String,
}

impl Segment {
    /// Create a new segment.
    pub fn new(segment_id: usize, content: impl Into<String>) -> Self {
        Self {
            segment_id,
            content: content.into(),
        }
    }
}
