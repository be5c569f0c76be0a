//! novel-tts configuration management.

use anyhow::Result as AnyResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PipelineError, Result};
use crate::pipeline::LeadingRun;
use crate::voice::VoiceProvider;

const DEFAULT_PAUSE_MS: u64 = 2000;

pub const PUNCTUATION_ENV: &str = "SEGMENTATION_PUNCTUATION";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovelTtsConfig {
    /// Characters that end a segment. Required to run the pipeline.
    #[serde(default)]
    pub segmentation_punctuation: Option<String>,

    /// Voice catalog and synthesis provider (minimax, doubao)
    #[serde(default = "default_provider")]
    pub tts_provider: String,

    /// Root for run output directories. None means the local data dir.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Pause after each synthesis request, in milliseconds
    #[serde(default = "default_pause_ms")]
    pub dispatch_pause_ms: u64,

    /// Drop a first run of text that has no speaker
    #[serde(default)]
    pub drop_unattributed_lead: bool,

    /// Directory with prompt templates replacing the built-in ones
    #[serde(default)]
    pub prompts_dir: Option<PathBuf>,

    /// llm-client presets per stage
    #[serde(default)]
    pub presets: StagePresets,

    #[serde(default)]
    pub minimax: MinimaxSettings,

    #[serde(default)]
    pub doubao: DoubaoSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagePresets {
    #[serde(default = "default_roles_preset")]
    pub roles: String,
    #[serde(default = "default_reasoning_preset")]
    pub speakers: String,
    #[serde(default = "default_reasoning_preset")]
    pub voices: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimaxSettings {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_minimax_model")]
    pub model: String,
    #[serde(default = "default_unit")]
    pub speed: f32,
    #[serde(default = "default_unit")]
    pub vol: f32,
    #[serde(default)]
    pub pitch: i32,
    #[serde(default = "default_emotion")]
    pub emotion: String,
    /// Voice catalog JSON replacing the built-in list
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoubaoSettings {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default = "default_cluster")]
    pub cluster: String,
    #[serde(default = "default_unit")]
    pub speed_ratio: f32,
    /// Voice catalog JSON replacing the built-in list
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_provider() -> String {
    "minimax".to_string()
}

fn default_pause_ms() -> u64 {
    DEFAULT_PAUSE_MS
}

fn default_roles_preset() -> String {
    "qwen3".to_string()
}

fn default_reasoning_preset() -> String {
    "gemini-pro".to_string()
}

fn default_minimax_model() -> String {
    "speech-02-hd".to_string()
}

fn default_unit() -> f32 {
    1.0
}

fn default_emotion() -> String {
    "calm".to_string()
}

fn default_cluster() -> String {
    "volcano_tts".to_string()
}

impl Default for NovelTtsConfig {
    fn default() -> Self {
        Self {
            segmentation_punctuation: None,
            tts_provider: default_provider(),
            output_dir: None,
            dispatch_pause_ms: default_pause_ms(),
            drop_unattributed_lead: false,
            prompts_dir: None,
            presets: StagePresets::default(),
            minimax: MinimaxSettings::default(),
            doubao: DoubaoSettings::default(),
        }
    }
}

impl Default for StagePresets {
    fn default() -> Self {
        Self {
            roles: default_roles_preset(),
            speakers: default_reasoning_preset(),
            voices: default_reasoning_preset(),
        }
    }
}

impl Default for MinimaxSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            group_id: None,
            api_key: None,
            model: default_minimax_model(),
            speed: default_unit(),
            vol: default_unit(),
            pitch: 0,
            emotion: default_emotion(),
            catalog: None,
        }
    }
}

impl Default for DoubaoSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            app_id: None,
            cluster: default_cluster(),
            speed_ratio: default_unit(),
            catalog: None,
        }
    }
}

impl NovelTtsConfig {
    /// Get the config file path: ~/.config/cli-programs/novel-tts.toml
    pub fn config_path() -> AnyResult<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("novel-tts.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> AnyResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: NovelTtsConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> AnyResult<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(process_env);
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(punctuation) = lookup(PUNCTUATION_ENV) {
            self.segmentation_punctuation = Some(punctuation);
        }
    }

    /// The configured boundary set; empty counts as missing.
    pub fn punctuation(&self) -> Result<&str> {
        self.segmentation_punctuation
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(PipelineError::MissingPunctuation)
    }

    pub fn provider(&self) -> Result<VoiceProvider> {
        self.tts_provider.parse()
    }

    pub fn catalog_path(&self, provider: VoiceProvider) -> Option<&Path> {
        match provider {
            VoiceProvider::Minimax => self.minimax.catalog.as_deref(),
            VoiceProvider::Doubao => self.doubao.catalog.as_deref(),
        }
    }

    pub fn leading_run(&self) -> LeadingRun {
        if self.drop_unattributed_lead {
            LeadingRun::Drop
        } else {
            LeadingRun::Keep
        }
    }

    /// Fixed wait after each synthesis request.
    pub fn dispatch_pause(&self) -> Duration {
        Duration::from_millis(self.dispatch_pause_ms)
    }

    /// Root for run directories.
    pub fn output_root(&self) -> AnyResult<PathBuf> {
        if let Some(dir) = &self.output_dir {
            return Ok(dir.clone());
        }

        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|d| d.join("novel-tts").join("output"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }
}

/// Environment variable lookup used for credentials.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Read from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolve a credential: config value first, then `env`.
pub fn credential(
    configured: Option<&str>,
    provider: VoiceProvider,
    setting: &'static str,
    env_var: &'static str,
    env: EnvLookup<'_>,
) -> Result<String> {
    if let Some(value) = configured.filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }

    env(env_var)
        .filter(|v| !v.is_empty())
        .ok_or(PipelineError::MissingCredential {
            provider,
            setting,
            env_var,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NovelTtsConfig::default();
        assert!(config.segmentation_punctuation.is_none());
        assert_eq!(config.tts_provider, "minimax");
        assert_eq!(config.dispatch_pause(), Duration::from_secs(2));
        assert_eq!(config.presets.roles, "qwen3");
        assert_eq!(config.presets.speakers, "gemini-pro");
        assert_eq!(config.leading_run(), LeadingRun::Keep);
    }

    #[test]
    fn test_config_path() {
        let path = NovelTtsConfig::config_path().unwrap();
        assert!(path.ends_with("cli-programs/novel-tts.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
segmentation_punctuation = "。！？"
tts_provider = "doubao"
dispatch_pause_ms = 500
drop_unattributed_lead = true

[presets]
roles = "hunyuan"

[doubao]
app_id = "123"
speed_ratio = 1.2
catalog = "/voices/doubao.json"
"#;
        let config: NovelTtsConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.punctuation().unwrap(), "。！？");
        assert_eq!(config.provider().unwrap(), VoiceProvider::Doubao);
        assert_eq!(config.dispatch_pause_ms, 500);
        assert_eq!(config.leading_run(), LeadingRun::Drop);
        assert_eq!(config.presets.roles, "hunyuan");
        assert_eq!(config.presets.voices, "gemini-pro");
        assert_eq!(config.doubao.app_id.as_deref(), Some("123"));
        assert_eq!(config.doubao.cluster, "volcano_tts");
        assert_eq!(
            config.catalog_path(VoiceProvider::Doubao),
            Some(Path::new("/voices/doubao.json"))
        );
        assert_eq!(config.catalog_path(VoiceProvider::Minimax), None);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: NovelTtsConfig = toml::from_str("").unwrap();
        assert_eq!(config.minimax.model, "speech-02-hd");
        assert_eq!(config.minimax.emotion, "calm");
        assert_eq!(config.doubao.speed_ratio, 1.0);
    }

    #[test]
    fn test_missing_and_empty_punctuation() {
        let mut config = NovelTtsConfig::default();
        assert!(matches!(
            config.punctuation(),
            Err(PipelineError::MissingPunctuation)
        ));

        config.segmentation_punctuation = Some(String::new());
        assert!(matches!(
            config.punctuation(),
            Err(PipelineError::MissingPunctuation)
        ));
    }

    #[test]
    fn test_env_override_wins() {
        let mut config = NovelTtsConfig {
            segmentation_punctuation: Some("。".to_string()),
            ..Default::default()
        };
        config.apply_overrides(|key| (key == PUNCTUATION_ENV).then(|| "，。".to_string()));
        assert_eq!(config.punctuation().unwrap(), "，。");

        config.apply_overrides(|_| None);
        assert_eq!(config.punctuation().unwrap(), "，。");
    }

    #[test]
    fn test_unknown_provider() {
        let config = NovelTtsConfig {
            tts_provider: "polly".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.provider(),
            Err(PipelineError::UnknownProvider(_))
        ));
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_configured_credential_wins() {
        let env = |_: &str| Some("from-env".to_string());
        let key = credential(
            Some("from-config"),
            VoiceProvider::Minimax,
            "API key",
            "MINIMAXI_API_KEY",
            &env,
        )
        .unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn test_credential_falls_back_to_env() {
        let env = |key: &str| (key == "MINIMAXI_GROUP_ID").then(|| "g-1".to_string());
        let group = credential(
            Some(""),
            VoiceProvider::Minimax,
            "Group ID",
            "MINIMAXI_GROUP_ID",
            &env,
        )
        .unwrap();
        assert_eq!(group, "g-1");
    }

    #[test]
    fn test_missing_credential() {
        let err = credential(None, VoiceProvider::Doubao, "App ID", "DOUBAO_APPID", &no_env)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "App ID not found for doubao. Set DOUBAO_APPID environment variable or add to config."
        );
    }

    #[test]
    fn test_explicit_output_root() {
        let config = NovelTtsConfig {
            output_dir: Some(PathBuf::from("/tmp/audio")),
            ..Default::default()
        };
        assert_eq!(config.output_root().unwrap(), PathBuf::from("/tmp/audio"));
    }
}
