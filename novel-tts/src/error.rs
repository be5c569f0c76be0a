//! Error taxonomy for a pipeline run.
//!
//! Join misses are not represented here: they degrade to `None` fields and only
//! surface as [`PipelineError::MissingVoice`] once a record reaches dispatch.

use std::path::PathBuf;
use thiserror::Error;

use crate::voice::VoiceProvider;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(
        "Segmentation punctuation is not configured. Set SEGMENTATION_PUNCTUATION or run 'novel-tts config set-punctuation'."
    )]
    MissingPunctuation,

    #[error("Segmentation punctuation '{punctuation}' does not form a character class: {message}")]
    InvalidPunctuation { punctuation: String, message: String },

    #[error("Unknown TTS provider '{0}' (expected 'minimax' or 'doubao')")]
    UnknownProvider(String),

    #[error("{setting} not found for {provider}. Set {env_var} environment variable or add to config.")]
    MissingCredential {
        provider: VoiceProvider,
        setting: &'static str,
        env_var: &'static str,
    },

    #[error("Failed to read prompt template {}: {source}", path.display())]
    Prompt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load {provider} voice catalog: {message}")]
    Catalog {
        provider: VoiceProvider,
        message: String,
    },

    #[error(transparent)]
    Llm(#[from] llm_client::LlmError),

    #[error("Malformed {stage} response: {message}")]
    MalformedResponse {
        stage: &'static str,
        message: String,
    },

    #[error("Segment {segment_id} ({}) has no resolved voice", speaker.as_deref().unwrap_or("unattributed"))]
    MissingVoice {
        segment_id: usize,
        speaker: Option<String>,
    },

    #[error("No TTS backend registered for {0}")]
    NoBackend(VoiceProvider),

    #[error("{provider} synthesis failed: {message}")]
    Synthesis {
        provider: VoiceProvider,
        message: String,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_voice_message_names_speaker() {
        let err = PipelineError::MissingVoice {
            segment_id: 4,
            speaker: Some("Ye Wenjie".to_string()),
        };
        assert_eq!(err.to_string(), "Segment 4 (Ye Wenjie) has no resolved voice");

        let err = PipelineError::MissingVoice {
            segment_id: 0,
            speaker: None,
        };
        assert!(err.to_string().contains("unattributed"));
    }

    #[test]
    fn test_llm_errors_pass_through_unchanged() {
        let err: PipelineError = llm_client::LlmError::RateLimited {
            retry_after: Some(5),
        }
        .into();
        assert_eq!(err.to_string(), "Rate limit exceeded. Retry after 5 seconds");
    }
}
