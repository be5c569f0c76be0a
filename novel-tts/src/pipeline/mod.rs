//! The segmentation, attribution and merge pipeline.
//!
//! Stages run strictly one after another: segment the text, extract the cast,
//! match voices, attribute speakers, then combine and merge into a script of
//! synthesis units.

pub mod combine;
pub mod merge;

pub use combine::{CombinedRecord, combine};
pub use merge::{LeadingRun, MergedRecord, merge};

use log::info;
use std::path::PathBuf;

use crate::cast::{attribute_speakers, extract_roles};
use crate::config::NovelTtsConfig;
use crate::error::Result;
use crate::oracle::Oracle;
use crate::prompts::PromptSet;
use crate::text::Segmenter;
use crate::voice::{VoiceProvider, match_voices_for};

/// The three text-generation backends, one per stage.
#[derive(Clone)]
pub struct Oracles {
    pub roles: Oracle,
    pub speakers: Oracle,
    pub voices: Oracle,
}

impl Oracles {
    /// Build each stage's oracle from its `llm-client` preset.
    pub fn from_config(llm_config: &llm_client::Config, config: &NovelTtsConfig) -> Result<Self> {
        Ok(Self {
            roles: Oracle::from_preset(llm_config, &config.presets.roles)?,
            speakers: Oracle::from_preset(llm_config, &config.presets.speakers)?,
            voices: Oracle::from_preset(llm_config, &config.presets.voices)?,
        })
    }
}

/// Everything a run produced before synthesis.
#[derive(Debug, Clone)]
pub struct Script {
    pub records: Vec<MergedRecord>,
    pub segment_count: usize,
    pub role_count: usize,
}

/// A configured pipeline. Construction validates configuration, so a bad
/// punctuation set or provider selector fails before any oracle is called.
pub struct Pipeline {
    segmenter: Segmenter,
    provider: VoiceProvider,
    catalog: Option<PathBuf>,
    leading: LeadingRun,
    prompts: PromptSet,
    oracles: Oracles,
}

impl Pipeline {
    pub fn new(config: &NovelTtsConfig, prompts: PromptSet, oracles: Oracles) -> Result<Self> {
        let segmenter = Segmenter::new(config.punctuation()?)?;
        let provider = config.provider()?;

        Ok(Self {
            segmenter,
            provider,
            catalog: config.catalog_path(provider).map(PathBuf::from),
            leading: config.leading_run(),
            prompts,
            oracles,
        })
    }

    pub fn provider(&self) -> VoiceProvider {
        self.provider
    }

    /// Run every stage up to and including the merge.
    pub async fn build_script(&self, text: &str) -> Result<Script> {
        let segments = self.segmenter.segment(text);
        info!("Split text into {} segments", segments.len());

        let roles = extract_roles(&self.oracles.roles, &self.prompts.identify_role, text).await?;

        let voices = match_voices_for(
            self.provider,
            self.catalog.as_deref(),
            &self.oracles.voices,
            &self.prompts.voice_match,
            &roles,
        )
        .await?;

        let speakers = attribute_speakers(
            &self.oracles.speakers,
            &self.prompts.identify_speaker,
            &segments,
            &roles,
        )
        .await?;

        let combined = combine(&segments, &speakers, &voices);
        let records = merge(&combined, self.leading);
        info!(
            "Merged {} segments into {} synthesis units",
            combined.len(),
            records.len()
        );

        Ok(Script {
            records,
            segment_count: segments.len(),
            role_count: roles.len(),
        })
    }
}
