//! Voice matching: pick a catalog voice for every role.
//!
//! Each TTS provider publishes its own voice catalog. A [`VoiceSource`] knows how
//! to load that catalog, what part of each entry the oracle should see, and which
//! field maps a chosen label back to the provider's voice handle.

pub mod doubao;
pub mod minimax;

pub use doubao::DoubaoCatalog;
pub use minimax::MinimaxCatalog;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::cast::{Role, flexible_id};
use crate::error::{PipelineError, Result};
use crate::oracle::{Oracle, parse_list};

/// TTS provider a voice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceProvider {
    Minimax,
    Doubao,
}

impl VoiceProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimax => "minimax",
            Self::Doubao => "doubao",
        }
    }
}

impl FromStr for VoiceProvider {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "minimax" => Ok(Self::Minimax),
            "doubao" => Ok(Self::Doubao),
            _ => Err(PipelineError::UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for VoiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete, playable voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Human-readable label as chosen by the oracle
    pub voice_name: String,
    pub voice_source: VoiceProvider,
    /// Provider voice id; `None` when the label is not in the catalog
    pub voice_handle: Option<String>,
}

/// The voice picked for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAssignment {
    pub role_id: i64,
    pub name: String,
    pub voice_info: VoiceInfo,
}

/// One item of the oracle's role -> voice answer.
#[derive(Debug, Clone, Deserialize)]
struct VoiceChoice {
    #[serde(deserialize_with = "flexible_id")]
    role_id: i64,
    name: String,
    voice_name: String,
}

/// A provider's voice catalog.
pub trait VoiceSource {
    /// Catalog entry as the provider publishes it
    type Entry: DeserializeOwned;
    /// Entry reduced to what the oracle should see
    type Projected: Serialize;

    fn provider(&self) -> VoiceProvider;

    /// Load the full catalog.
    fn load_catalog(&self) -> Result<Vec<Self::Entry>>;

    /// Reduce an entry for the oracle prompt.
    fn project(&self, entry: &Self::Entry) -> Self::Projected;

    /// Label the oracle chooses by.
    fn label<'a>(&self, entry: &'a Self::Entry) -> &'a str;

    /// Provider identifier the label resolves to.
    fn handle<'a>(&self, entry: &'a Self::Entry) -> &'a str;
}

/// Parse a catalog from `path`, or from the built-in JSON when no path is set.
pub(crate) fn read_catalog<E: DeserializeOwned>(
    provider: VoiceProvider,
    path: Option<&Path>,
    builtin: &str,
) -> Result<Vec<E>> {
    let catalog_error = |message: String| PipelineError::Catalog { provider, message };

    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| catalog_error(format!("{}: {}", path.display(), e)))?,
        None => builtin.to_string(),
    };

    serde_json::from_str(&content).map_err(|e| catalog_error(e.to_string()))
}

/// Label -> handle lookup over an unprojected catalog.
///
/// Duplicate labels keep the first entry.
pub struct CatalogIndex<'a> {
    handles: HashMap<&'a str, &'a str>,
}

impl<'a> CatalogIndex<'a> {
    pub fn build<S: VoiceSource>(source: &S, catalog: &'a [S::Entry]) -> Self {
        let mut handles = HashMap::with_capacity(catalog.len());
        for entry in catalog {
            handles
                .entry(source.label(entry))
                .or_insert_with(|| source.handle(entry));
        }
        Self { handles }
    }

    /// Provider handle for `label`, or `None` when the catalog has no such voice.
    pub fn resolve(&self, label: &str) -> Option<String> {
        self.handles.get(label).map(|handle| handle.to_string())
    }
}

/// Build the user prompt listing the cast and the projected catalog.
pub fn voice_prompt<P: Serialize>(roles: &[Role], catalog: &[P]) -> Result<String> {
    Ok(format!(
        "# Roles: {}\n# Voice catalog: {}\n",
        serde_json::to_string(roles)?,
        serde_json::to_string(catalog)?
    ))
}

/// Matches roles to voices of one provider through the oracle.
pub struct VoiceMatcher<'o, S> {
    source: S,
    oracle: &'o Oracle,
    system_prompt: &'o str,
}

impl<'o, S: VoiceSource> VoiceMatcher<'o, S> {
    pub fn new(source: S, oracle: &'o Oracle, system_prompt: &'o str) -> Self {
        Self {
            source,
            oracle,
            system_prompt,
        }
    }

    /// One assignment per oracle choice.
    ///
    /// `role_id` and `name` pass through from the oracle as given; names that
    /// are not in `roles` are only logged.
    pub async fn match_voices(&self, roles: &[Role]) -> Result<Vec<VoiceAssignment>> {
        let provider = self.source.provider();
        let catalog = self.source.load_catalog()?;
        let projected: Vec<S::Projected> =
            catalog.iter().map(|entry| self.source.project(entry)).collect();

        let user_prompt = voice_prompt(roles, &projected)?;
        let raw = self
            .oracle
            .complete_json(self.system_prompt, &user_prompt)
            .await?;
        let choices: Vec<VoiceChoice> = parse_list(&raw, "voice matching", "voices")?;

        let index = CatalogIndex::build(&self.source, &catalog);
        let known: HashSet<&str> = roles.iter().map(|r| r.name.as_str()).collect();

        let assignments: Vec<VoiceAssignment> = choices
            .into_iter()
            .map(|choice| {
                if !known.contains(choice.name.as_str()) {
                    warn!("Voice matched for unknown role '{}'", choice.name);
                }

                let voice_handle = index.resolve(&choice.voice_name);
                if voice_handle.is_none() {
                    warn!(
                        "Voice '{}' for '{}' is not in the {} catalog",
                        choice.voice_name, choice.name, provider
                    );
                }

                VoiceAssignment {
                    role_id: choice.role_id,
                    name: choice.name,
                    voice_info: VoiceInfo {
                        voice_name: choice.voice_name,
                        voice_source: provider,
                        voice_handle,
                    },
                }
            })
            .collect();

        info!("Matched {} voices from the {} catalog", assignments.len(), provider);
        Ok(assignments)
    }
}

/// Run voice matching with the catalog of `provider`.
pub async fn match_voices_for(
    provider: VoiceProvider,
    catalog_path: Option<&Path>,
    oracle: &Oracle,
    system_prompt: &str,
    roles: &[Role],
) -> Result<Vec<VoiceAssignment>> {
    match provider {
        VoiceProvider::Minimax => {
            VoiceMatcher::new(MinimaxCatalog::new(catalog_path), oracle, system_prompt)
                .match_voices(roles)
                .await
        }
        VoiceProvider::Doubao => {
            VoiceMatcher::new(DoubaoCatalog::new(catalog_path), oracle, system_prompt)
                .match_voices(roles)
                .await
        }
    }
}
