//! MiniMax voice catalog: resolved by `voice_name` to `voice_id`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{VoiceProvider, VoiceSource, read_catalog};
use crate::error::Result;

const BUILTIN_CATALOG: &str = include_str!("../../catalogs/minimax_voice_list.json");

#[derive(Debug, Clone, Deserialize)]
pub struct MinimaxVoice {
    pub voice_id: String,
    pub voice_name: String,
    #[serde(default)]
    pub description: String,
}

/// What the oracle sees of a MiniMax voice.
#[derive(Debug, Clone, Serialize)]
pub struct MinimaxProjection {
    pub voice_name: String,
    pub description: String,
}

pub struct MinimaxCatalog {
    path: Option<PathBuf>,
}

impl MinimaxCatalog {
    /// Catalog read from `path`, or the built-in list.
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }
}

impl VoiceSource for MinimaxCatalog {
    type Entry = MinimaxVoice;
    type Projected = MinimaxProjection;

    fn provider(&self) -> VoiceProvider {
        VoiceProvider::Minimax
    }

    fn load_catalog(&self) -> Result<Vec<MinimaxVoice>> {
        read_catalog(VoiceProvider::Minimax, self.path.as_deref(), BUILTIN_CATALOG)
    }

    fn project(&self, entry: &MinimaxVoice) -> MinimaxProjection {
        MinimaxProjection {
            voice_name: entry.voice_name.clone(),
            description: entry.description.clone(),
        }
    }

    fn label<'a>(&self, entry: &'a MinimaxVoice) -> &'a str {
        &entry.voice_name
    }

    fn handle<'a>(&self, entry: &'a MinimaxVoice) -> &'a str {
        &entry.voice_id
    }
}
