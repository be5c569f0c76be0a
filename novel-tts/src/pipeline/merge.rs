//! Run-length merge of consecutive records spoken by the same speaker.

use serde::{Deserialize, Serialize};

use super::combine::CombinedRecord;
use crate::voice::VoiceInfo;

/// One synthesis unit: a run of same-speaker segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRecord {
    /// Dense 0-based position in the merged sequence
    pub segment_id: usize,
    pub content: String,
    pub speaker: Option<String>,
    pub voice_info: Option<VoiceInfo>,
}

/// What to do with a first run that has no speaker (null or empty name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadingRun {
    #[default]
    Keep,
    Drop,
}

/// Collapse consecutive records with equal speakers.
///
/// Speakers compare by exact equality, `None` and `""` being different speakers.
/// Newlines are removed from every merged record.
pub fn merge(records: &[CombinedRecord], leading: LeadingRun) -> Vec<MergedRecord> {
    let mut merged = Vec::new();
    let mut first_run = true;

    let mut current_speaker: Option<&str> = Some("");
    let mut current_voice: Option<&VoiceInfo> = None;
    let mut buffer = String::new();

    let mut flush = |speaker: Option<&str>, voice: Option<&VoiceInfo>, buffer: &str| {
        let unattributed = speaker.is_none_or(str::is_empty);
        let skip = first_run && unattributed && leading == LeadingRun::Drop;
        first_run = false;
        if skip {
            return;
        }

        merged.push(MergedRecord {
            segment_id: merged.len(),
            content: buffer.chars().filter(|c| *c != '\n' && *c != '\r').collect(),
            speaker: speaker.map(str::to_string),
            voice_info: voice.cloned(),
        });
    };

    for record in records {
        let speaker = record.speaker.as_deref();

        if speaker == current_speaker {
            buffer.push_str(&record.content);
        } else {
            if !buffer.is_empty() {
                flush(current_speaker, current_voice, &buffer);
            }
            buffer = record.content.clone();
            current_speaker = speaker;
        }
        current_voice = record.voice_info.as_ref();
    }

    if !buffer.is_empty() {
        flush(current_speaker, current_voice, &buffer);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::VoiceProvider;
    use proptest::prelude::*;

    fn record(segment_id: usize, content: &str, speaker: Option<&str>) -> CombinedRecord {
        CombinedRecord {
            segment_id,
            content: content.to_string(),
            speaker: speaker.map(str::to_string),
            voice_info: speaker.map(|name| VoiceInfo {
                voice_name: name.to_string(),
                voice_source: VoiceProvider::Doubao,
                voice_handle: Some(format!("voice-{}", name)),
            }),
        }
    }

    #[test]
    fn test_dialogue_merges_into_two_runs() {
        let records = vec![
            record(0, "他说：“", Some("他")),
            record(1, "你好。”", Some("他")),
            record(2, "她回答：“", Some("她")),
            record(3, "再见。”", Some("她")),
        ];

        let merged = merge(&records, LeadingRun::Keep);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].segment_id, 0);
        assert_eq!(merged[0].content, "他说：“你好。”");
        assert_eq!(merged[0].speaker.as_deref(), Some("他"));
        assert_eq!(
            merged[0].voice_info.as_ref().unwrap().voice_handle.as_deref(),
            Some("voice-他")
        );
        assert_eq!(merged[1].segment_id, 1);
        assert_eq!(merged[1].content, "她回答：“再见。”");
    }

    #[test]
    fn test_alternating_speakers_unchanged() {
        let records = vec![
            record(0, "a", Some("x")),
            record(1, "b", Some("y")),
            record(2, "c", Some("x")),
        ];

        let merged = merge(&records, LeadingRun::Keep);

        assert_eq!(merged.len(), 3);
        for (original, merged) in records.iter().zip(&merged) {
            assert_eq!(original.segment_id, merged.segment_id);
            assert_eq!(original.content, merged.content);
            assert_eq!(original.speaker, merged.speaker);
            assert_eq!(original.voice_info, merged.voice_info);
        }
    }

    #[test]
    fn test_newlines_removed_including_last_run() {
        let records = vec![
            record(0, "line\none", Some("x")),
            record(1, "line\ntwo", Some("y")),
        ];

        let merged = merge(&records, LeadingRun::Keep);
        assert_eq!(merged[0].content, "lineone");
        assert_eq!(merged[1].content, "linetwo");
    }

    #[test]
    fn test_leading_unattributed_run_kept_by_default() {
        let records = vec![
            record(0, "夜。", None),
            record(1, "风。", None),
            record(2, "“谁？”", Some("他")),
        ];

        let merged = merge(&records, LeadingRun::Keep);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "夜。风。");
        assert_eq!(merged[0].speaker, None);
        assert_eq!(merged[0].voice_info, None);
        assert_eq!(merged[1].segment_id, 1);
    }

    #[test]
    fn test_leading_empty_speaker_run_kept_by_default() {
        let records = vec![record(0, "夜。", Some("")), record(1, "“谁？”", Some("他"))];

        let merged = merge(&records, LeadingRun::Keep);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].speaker.as_deref(), Some(""));
        assert_eq!(merged[0].content, "夜。");
    }

    #[test]
    fn test_leading_unattributed_run_dropped() {
        let records = vec![
            record(0, "夜。", None),
            record(1, "“谁？”", Some("他")),
            record(2, "无人回答。", None),
        ];

        let merged = merge(&records, LeadingRun::Drop);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].segment_id, 0);
        assert_eq!(merged[0].content, "“谁？”");
        // Only the leading run is affected
        assert_eq!(merged[1].segment_id, 1);
        assert_eq!(merged[1].speaker, None);
    }

    #[test]
    fn test_leading_empty_speaker_run_dropped() {
        let records = vec![record(0, "夜。", Some("")), record(1, "“谁？”", Some("他"))];

        let merged = merge(&records, LeadingRun::Drop);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].segment_id, 0);
        assert_eq!(merged[0].speaker.as_deref(), Some("他"));
        assert_eq!(merged[0].content, "“谁？”");
    }

    #[test]
    fn test_drop_keeps_attributed_first_run() {
        let records = vec![record(0, "a", Some("x")), record(1, "b", None)];

        let merged = merge(&records, LeadingRun::Drop);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_none_and_empty_are_distinct_speakers() {
        let records = vec![
            record(0, "a", Some("x")),
            record(1, "b", None),
            record(2, "c", Some("")),
        ];

        let merged = merge(&records, LeadingRun::Keep);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge(&[], LeadingRun::Keep).is_empty());
    }

    fn speaker_strategy() -> impl Strategy<Value = Vec<(Option<&'static str>, String)>> {
        proptest::collection::vec(
            (
                prop::sample::select(vec![Some("甲"), Some("乙"), None]),
                "[a-z\n]{1,6}".prop_filter("needs a visible char", |s| {
                    s.chars().any(|c| c != '\n')
                }),
            ),
            0..40,
        )
    }

    proptest! {
        #[test]
        fn prop_runs_concatenate_in_order(items in speaker_strategy()) {
            let records: Vec<CombinedRecord> = items
                .iter()
                .enumerate()
                .map(|(i, (speaker, content))| record(i, content, *speaker))
                .collect();

            // Expected runs, computed independently
            let mut runs: Vec<(Option<&str>, String)> = Vec::new();
            for (speaker, content) in &items {
                match runs.last_mut() {
                    Some((last, text)) if last == speaker => text.push_str(content),
                    _ => runs.push((*speaker, content.clone())),
                }
            }

            let merged = merge(&records, LeadingRun::Keep);

            prop_assert_eq!(merged.len(), runs.len());
            for (i, (record, (speaker, text))) in merged.iter().zip(&runs).enumerate() {
                prop_assert_eq!(record.segment_id, i);
                prop_assert_eq!(record.speaker.as_deref(), *speaker);
                prop_assert_eq!(record.content.clone(), text.replace('\n', ""));
            }
        }
    }
}
