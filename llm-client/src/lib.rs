//! Shared text-generation client library for the novel-tts workspace
//!
//! Provides a unified interface over OpenAI-compatible chat-completion gateways:
//! - New API (self-hosted multi-model gateway)
//! - Qwen (DashScope compatible mode)
//! - Hunyuan
//! - OpenRouter
//! - Cerebras

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ModelPreset, ProviderConfig};
pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, ResponseFormat, TokenUsage};
pub use providers::{MockProvider, ProviderKind, get_provider};
