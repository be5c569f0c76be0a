//! Doubao voice catalog: resolved by `character_name` to `voice_type`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{VoiceProvider, VoiceSource, read_catalog};
use crate::error::Result;

const BUILTIN_CATALOG: &str = include_str!("../../catalogs/doubao_voice_list.json");

#[derive(Debug, Clone, Deserialize)]
pub struct DoubaoVoice {
    pub voice_type: String,
    pub character_name: String,
    #[serde(default)]
    pub category: String,
}

/// What the oracle sees of a Doubao voice. The label is renamed so every
/// provider presents `voice_name` to the oracle.
#[derive(Debug, Clone, Serialize)]
pub struct DoubaoProjection {
    pub voice_name: String,
    pub category: String,
}

pub struct DoubaoCatalog {
    path: Option<PathBuf>,
}

impl DoubaoCatalog {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }
}

impl VoiceSource for DoubaoCatalog {
    type Entry = DoubaoVoice;
    type Projected = DoubaoProjection;

    fn provider(&self) -> VoiceProvider {
        VoiceProvider::Doubao
    }

    fn load_catalog(&self) -> Result<Vec<DoubaoVoice>> {
        read_catalog(VoiceProvider::Doubao, self.path.as_deref(), BUILTIN_CATALOG)
    }

    fn project(&self, entry: &DoubaoVoice) -> DoubaoProjection {
        DoubaoProjection {
            voice_name: entry.character_name.clone(),
            category: entry.category.clone(),
        }
    }

    fn label<'a>(&self, entry: &'a DoubaoVoice) -> &'a str {
        &entry.character_name
    }

    fn handle<'a>(&self, entry: &'a DoubaoVoice) -> &'a str {
        &entry.voice_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::CatalogIndex;

    #[test]
    fn test_builtin_catalog_resolves_by_character_name() {
        let source = DoubaoCatalog::new(None);
        let catalog = source.load_catalog().unwrap();
        let index = CatalogIndex::build(&source, &catalog);

        assert_eq!(
            index.resolve("魅力苏菲").as_deref(),
            Some("zh_female_sophie_conversation_wvae_bigtts")
        );
        // voice_type is not a label
        assert_eq!(index.resolve("zh_female_sophie_conversation_wvae_bigtts"), None);
    }

    #[test]
    fn test_projection_renames_label() {
        let source = DoubaoCatalog::new(None);
        let entry = DoubaoVoice {
            voice_type: "zh_male_jingqiangkanye_moon_bigtts".to_string(),
            character_name: "京腔侃爷".to_string(),
            category: "趣味口音".to_string(),
        };

        let json = serde_json::to_value(source.project(&entry)).unwrap();
        assert_eq!(json["voice_name"], "京腔侃爷");
        assert_eq!(json["category"], "趣味口音");
        assert!(json.get("voice_type").is_none());
    }
}
