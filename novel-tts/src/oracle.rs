//! Text-generation oracle wrapper.
//!
//! Thin layer over an `llm_client` provider that always asks for a JSON object
//! and turns the answer into typed lists.

use std::sync::Arc;

use llm_client::{Config, LlmProvider, LlmRequest, ResponseFormat, get_provider};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PipelineError, Result};

const TEMPERATURE: f32 = 0.7;

/// One configured text-generation backend.
#[derive(Clone)]
pub struct Oracle {
    provider: Arc<dyn LlmProvider>,
}

impl Oracle {
    /// Wrap an existing provider.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Build an oracle from a named `llm-client` preset.
    pub fn from_preset(config: &Config, preset_name: &str) -> Result<Self> {
        let preset = config.get_preset(preset_name)?;
        let provider_config = config.get_provider_config(&preset.provider);
        let provider = get_provider(preset, provider_config)?;
        provider.is_available()?;

        debug!(
            "Preset '{}' uses {} (model: {})",
            preset_name,
            provider.name(),
            preset.model
        );

        Ok(Self {
            provider: Arc::from(provider),
        })
    }

    /// Display name of the underlying provider.
    pub fn name(&self) -> &'static str {
        self.provider.name()
    }

    /// Ask for a strict JSON answer and return the raw text.
    pub async fn complete_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = LlmRequest {
            prompt: user_prompt.to_string(),
            system_prompt: Some(system_prompt.to_string()),
            max_tokens: None,
            temperature: Some(TEMPERATURE),
            response_format: Some(ResponseFormat::JsonObject),
        };

        let response = self.provider.complete(request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "{}: {} tokens in, {} out",
                self.provider.name(),
                usage.input_tokens,
                usage.output_tokens
            );
        }

        Ok(response.content)
    }
}

/// Parse a list answer from an oracle.
///
/// Accepts a bare JSON array, an object holding the array under `key`, or an
/// object with exactly one array-valued field.
pub fn parse_list<T: DeserializeOwned>(raw: &str, stage: &'static str, key: &str) -> Result<Vec<T>> {
    let malformed = |message: String| PipelineError::MalformedResponse { stage, message };

    let value: Value = serde_json::from_str(raw.trim()).map_err(|e| malformed(e.to_string()))?;

    let list = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(list @ Value::Array(_)) => list,
            Some(other) => {
                return Err(malformed(format!("'{}' is not a list: {}", key, other)));
            }
            None => {
                let mut arrays = map.into_iter().filter(|(_, v)| v.is_array());
                match (arrays.next(), arrays.next()) {
                    (Some((_, list)), None) => list,
                    _ => return Err(malformed(format!("expected a '{}' list", key))),
                }
            }
        },
        other => return Err(malformed(format!("expected a list, got {}", other))),
    };

    serde_json::from_value(list).map_err(|e| malformed(e.to_string()))
}
