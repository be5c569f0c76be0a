//! LLM provider implementations

pub mod mock;
mod openai_compatible;

pub use mock::MockProvider;
pub use openai_compatible::OpenAICompatibleProvider;

use std::str::FromStr;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    NewApi,
    Qwen,
    Hunyuan,
    OpenRouter,
    Cerebras,
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "new-api" | "new_api" | "newapi" => Ok(Self::NewApi),
            "qwen" | "dashscope" => Ok(Self::Qwen),
            "hunyuan" => Ok(Self::Hunyuan),
            "openrouter" => Ok(Self::OpenRouter),
            "cerebras" => Ok(Self::Cerebras),
            _ => Err(LlmError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }
}

impl ProviderKind {
    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NewApi => "New API",
            Self::Qwen => "Qwen",
            Self::Hunyuan => "Hunyuan",
            Self::OpenRouter => "OpenRouter",
            Self::Cerebras => "Cerebras",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::NewApi => "NEW_API_TOKEN",
            Self::Qwen => "QWEN_TOKEN",
            Self::Hunyuan => "HUNYUAN_TOKEN",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Cerebras => "CEREBRAS_API_KEY",
        }
    }

    /// Environment variable that may override the base URL
    pub fn base_url_env_var(&self) -> &'static str {
        match self {
            Self::NewApi => "NEW_API_BASE_URL",
            Self::Qwen => "QWEN_BASE_URL",
            Self::Hunyuan => "HUNYUAN_BASE_URL",
            Self::OpenRouter => "OPENROUTER_BASE_URL",
            Self::Cerebras => "CEREBRAS_BASE_URL",
        }
    }

    /// Public endpoint, if the provider has one. New API is always self-hosted.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::NewApi => None,
            Self::Qwen => Some("https://dashscope.aliyuncs.com/compatible-mode/v1"),
            Self::Hunyuan => Some("https://api.hunyuan.cloud.tencent.com/v1"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Self::Cerebras => Some("https://api.cerebras.ai/v1"),
        }
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind: ProviderKind = preset.provider.parse()?;
    let api_key = get_api_key(provider_config, kind)?;
    let base_url = get_base_url(provider_config, kind)?;

    let provider = OpenAICompatibleProvider::new(
        &preset.model,
        &base_url,
        api_key,
        kind.display_name(),
    )?
    .with_thinking_disabled(kind == ProviderKind::Qwen);

    Ok(Box::new(provider))
}

/// Get API key from config or environment variable
fn get_api_key(config: Option<&ProviderConfig>, kind: ProviderKind) -> Result<String> {
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    std::env::var(kind.env_var()).map_err(|_| LlmError::MissingApiKey {
        provider: kind.display_name().to_string(),
        env_var: kind.env_var().to_string(),
    })
}

/// Get base URL from config, environment variable, or the provider default
fn get_base_url(config: Option<&ProviderConfig>, kind: ProviderKind) -> Result<String> {
    if let Some(url) = config.and_then(|c| c.base_url.clone()) {
        return Ok(url);
    }

    if let Ok(url) = std::env::var(kind.base_url_env_var()) {
        return Ok(url);
    }

    kind.default_base_url()
        .map(str::to_string)
        .ok_or_else(|| LlmError::MissingBaseUrl {
            provider: kind.display_name().to_string(),
            env_var: kind.base_url_env_var().to_string(),
        })
}
