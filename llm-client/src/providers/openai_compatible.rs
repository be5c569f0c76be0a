//! OpenAI-compatible chat completions provider
//!
//! Every supported gateway (New API, Qwen compatible mode, Hunyuan, OpenRouter,
//! Cerebras) speaks this protocol; they differ only in base URL, key and the
//! occasional vendor flag.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};

/// Provider for OpenAI-compatible APIs
pub struct OpenAICompatibleProvider {
    model: String,
    base_url: String,
    api_key: String,
    name: &'static str,
    disable_thinking: bool,
    client: Client,
}

impl OpenAICompatibleProvider {
    /// Create a new OpenAI-compatible provider
    pub fn new(model: &str, base_url: &str, api_key: String, name: &'static str) -> Result<Self> {
        let client = Client::new();

        Ok(Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            name,
            disable_thinking: false,
            client,
        })
    }

    /// Send `enable_thinking: false` with each request (Qwen3 hybrid models)
    pub fn with_thinking_disabled(mut self, disabled: bool) -> Self {
        self.disable_thinking = disabled;
        self
    }

    fn build_request(&self, request: &LlmRequest) -> ChatCompletionRequest {
        let mut messages = Vec::new();

        if let Some(system) = &request.system_prompt {
            messages.push(Message {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(Message {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.response_format.map(|f| WireResponseFormat {
                kind: f.as_str(),
            }),
            enable_thinking: self.disable_thinking.then_some(false),
        }
    }
}

// OpenAI API request/response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_thinking: Option<bool>,
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl LlmProvider for OpenAICompatibleProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let chat_request = self.build_request(&request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!("POST {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LlmError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            return Err(match status.as_u16() {
                429 => LlmError::RateLimited { retry_after },
                503 => LlmError::ServerOverloaded { message },
                code => LlmError::ApiError {
                    message,
                    status_code: Some(code),
                },
            });
        }

        let chat_response: ChatCompletionResponse =
            response.json().await.map_err(|e| LlmError::ApiError {
                message: format!("Failed to parse response: {}", e),
                status_code: None,
            })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::ApiError {
                message: "Response contained no message content".to_string(),
                status_code: None,
            })?;

        let usage = chat_response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            usage,
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(LlmError::ProviderUnavailable(format!(
                "{} has no base URL",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ResponseFormat;

    fn provider() -> OpenAICompatibleProvider {
        OpenAICompatibleProvider::new("qwen3-235b-a22b", "https://example.com/v1/", "k".into(), "Qwen")
            .unwrap()
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(provider().base_url, "https://example.com/v1");
    }

    #[test]
    fn test_request_body_carries_json_format_and_system_prompt() {
        let request = LlmRequest {
            prompt: "text".to_string(),
            system_prompt: Some("be terse".to_string()),
            temperature: Some(0.7),
            response_format: Some(ResponseFormat::JsonObject),
            ..Default::default()
        };

        let body = serde_json::to_value(provider().build_request(&request)).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "text");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("enable_thinking").is_none());
    }

    #[test]
    fn test_thinking_flag_only_when_disabled() {
        let request = LlmRequest {
            prompt: "p".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(
            provider()
                .with_thinking_disabled(true)
                .build_request(&request),
        )
        .unwrap();
        assert_eq!(body["enable_thinking"], false);
    }

    #[test]
    fn test_response_without_content_field_parses() {
        let json = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
        assert!(parsed.usage.is_none());
    }
}
