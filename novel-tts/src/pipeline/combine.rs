//! Join segments with their speaker and the speaker's voice.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cast::SpeakerAssignment;
use crate::text::Segment;
use crate::voice::{VoiceAssignment, VoiceInfo};

/// A segment with its speaker and voice, either of which may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub segment_id: usize,
    pub content: String,
    pub speaker: Option<String>,
    pub voice_info: Option<VoiceInfo>,
}

/// One record per segment, in segment order.
///
/// Lookups take the first matching assignment; a miss leaves the field `None`.
pub fn combine(
    segments: &[Segment],
    speakers: &[SpeakerAssignment],
    voices: &[VoiceAssignment],
) -> Vec<CombinedRecord> {
    let mut speaker_by_segment: HashMap<usize, Option<&str>> = HashMap::new();
    for assignment in speakers {
        speaker_by_segment
            .entry(assignment.segment_id)
            .or_insert(assignment.speaker.as_deref());
    }

    let mut voice_by_name: HashMap<&str, &VoiceInfo> = HashMap::new();
    for assignment in voices {
        voice_by_name
            .entry(assignment.name.as_str())
            .or_insert(&assignment.voice_info);
    }

    segments
        .iter()
        .map(|segment| {
            let speaker = speaker_by_segment
                .get(&segment.segment_id)
                .copied()
                .flatten();
            let voice_info = speaker
                .and_then(|name| voice_by_name.get(name))
                .map(|info| (*info).clone());

            CombinedRecord {
                segment_id: segment.segment_id,
                content: segment.content.clone(),
                speaker: speaker.map(str::to_string),
                voice_info,
            }
        })
        .collect()
}
