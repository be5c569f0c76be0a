//! Prompt templates for the three text-generation stages.

use std::fs;
use std::path::Path;

use crate::error::{PipelineError, Result};

pub const IDENTIFY_ROLE_FILE: &str = "identify_role.md";
pub const IDENTIFY_SPEAKER_FILE: &str = "identify_speaker.md";
pub const VOICE_MATCH_FILE: &str = "auto_voice_match.md";

/// System prompts, one per oracle stage.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub identify_role: String,
    pub identify_speaker: String,
    pub voice_match: String,
}

impl PromptSet {
    /// Templates compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            identify_role: include_str!("../prompts/identify_role.md").to_string(),
            identify_speaker: include_str!("../prompts/identify_speaker.md").to_string(),
            voice_match: include_str!("../prompts/auto_voice_match.md").to_string(),
        }
    }

    /// Read all three templates from `dir`. Any unreadable file fails the load.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            identify_role: read_template(dir, IDENTIFY_ROLE_FILE)?,
            identify_speaker: read_template(dir, IDENTIFY_SPEAKER_FILE)?,
            voice_match: read_template(dir, VOICE_MATCH_FILE)?,
        })
    }

    /// Load from `dir` when configured, otherwise use the built-in set.
    pub fn resolve(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::load(dir),
            None => Ok(Self::builtin()),
        }
    }
}

fn read_template(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    fs::read_to_string(&path).map_err(|source| PipelineError::Prompt { path, source })
}
