//! Speaker attribution: map every segment to a role name or the narrator.

use log::{info, warn};

use super::{Role, SpeakerAssignment};
use crate::error::Result;
use crate::oracle::{Oracle, parse_list};
use crate::text::Segment;

/// Build the user prompt listing the cast and the ordered segments.
pub fn speaker_prompt(segments: &[Segment], roles: &[Role]) -> Result<String> {
    Ok(format!(
        "# Roles: {}\n# Segments: {}\n",
        serde_json::to_string(roles)?,
        serde_json::to_string(segments)?
    ))
}

/// Ask the oracle who speaks each segment.
///
/// Completeness is not enforced here: segments the oracle skips end up with no
/// speaker when the records are combined.
pub async fn attribute_speakers(
    oracle: &Oracle,
    system_prompt: &str,
    segments: &[Segment],
    roles: &[Role],
) -> Result<Vec<SpeakerAssignment>> {
    let user_prompt = speaker_prompt(segments, roles)?;
    let raw = oracle.complete_json(system_prompt, &user_prompt).await?;
    let assignments: Vec<SpeakerAssignment> =
        parse_list(&raw, "speaker attribution", "speakers")?;

    if assignments.len() != segments.len() {
        warn!(
            "Speaker attribution returned {} entries for {} segments",
            assignments.len(),
            segments.len()
        );
    }
    info!("Attributed {} segments", assignments.len());

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::MockProvider;
    use std::sync::Arc;

    fn roles() -> Vec<Role> {
        vec![Role {
            role_id: 0,
            name: "他".to_string(),
            description: "男".to_string(),
        }]
    }

    #[test]
    fn test_prompt_keeps_order_and_non_ascii() {
        let segments = vec![Segment::new(0, "他说："), Segment::new(1, "“你好。”")];
        let prompt = speaker_prompt(&segments, &roles()).unwrap();

        assert!(prompt.starts_with("# Roles: [{\"role_id\":0,\"name\":\"他\""));
        let first = prompt.find("他说：").unwrap();
        let second = prompt.find("“你好。”").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_attribute_speakers_allows_gaps() {
        let mock = Arc::new(MockProvider::always_succeeds(
            r#"{"speakers":[{"segment_id":0,"speaker":"narrator"}]}"#,
        ));
        let oracle = Oracle::new(mock.clone());
        let segments = vec![Segment::new(0, "他说："), Segment::new(1, "“你好。”")];

        let assignments = attribute_speakers(&oracle, "attribute", &segments, &roles())
            .await
            .unwrap();

        assert_eq!(
            assignments,
            vec![SpeakerAssignment {
                segment_id: 0,
                speaker: Some("narrator".to_string()),
            }]
        );
        assert!(mock.last_request().unwrap().prompt.contains("# Segments:"));
    }
}
