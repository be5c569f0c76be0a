//! Mock LLM provider for testing
//!
//! Answers with canned content (or a canned failure) and records every request
//! it receives so callers can assert on the prompts they built.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// A mock provider that replays a fixed outcome
pub struct MockProvider {
    /// Number of times to fail before succeeding (0 = always succeed)
    fail_count: usize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure (None = always succeed)
    fail_with: Option<LlmError>,
    /// Response content to return on success
    success_response: String,
    /// Requests seen so far, oldest first
    requests: Mutex<Vec<LlmRequest>>,
    /// Provider name for display
    name: &'static str,
}

impl MockProvider {
    fn build(fail_count: usize, fail_with: Option<LlmError>, response: &str) -> Self {
        Self {
            fail_count,
            call_count: AtomicUsize::new(0),
            fail_with,
            success_response: response.to_string(),
            requests: Mutex::new(Vec::new()),
            name: "mock",
        }
    }

    /// Create a provider that fails `n` times with the given error, then succeeds
    pub fn fails_then_succeeds(n: usize, error: LlmError, response: &str) -> Self {
        Self::build(n, Some(error), response)
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: LlmError) -> Self {
        Self::build(usize::MAX, Some(error), "")
    }

    /// Create a provider that always succeeds
    pub fn always_succeeds(response: &str) -> Self {
        Self::build(0, None, response)
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.requests
            .lock()
            .ok()
            .and_then(|requests| requests.last().cloned())
    }

    /// Set a custom provider name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if call_num < self.fail_count {
            if let Some(err) = self.fail_with.as_ref() {
                return Err(clone_error(err));
            }
        }

        Ok(LlmResponse {
            content: self.success_response.clone(),
            model: "mock-model".to_string(),
            usage: None,
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}

/// LlmError holds non-Clone sources (io, toml), so those collapse to ConfigError
fn clone_error(err: &LlmError) -> LlmError {
    match err {
        LlmError::ServerOverloaded { message } => LlmError::ServerOverloaded {
            message: message.clone(),
        },
        LlmError::MissingApiKey { provider, env_var } => LlmError::MissingApiKey {
            provider: provider.clone(),
            env_var: env_var.clone(),
        },
        LlmError::MissingBaseUrl { provider, env_var } => LlmError::MissingBaseUrl {
            provider: provider.clone(),
            env_var: env_var.clone(),
        },
        LlmError::RateLimited { retry_after } => LlmError::RateLimited {
            retry_after: *retry_after,
        },
        LlmError::ApiError {
            message,
            status_code,
        } => LlmError::ApiError {
            message: message.clone(),
            status_code: *status_code,
        },
        LlmError::ProviderUnavailable(s) => LlmError::ProviderUnavailable(s.clone()),
        LlmError::ConfigError(s) => LlmError::ConfigError(s.clone()),
        LlmError::InvalidPreset(s) => LlmError::InvalidPreset(s.clone()),
        LlmError::Io(_) => LlmError::ConfigError("IO error (mock)".to_string()),
        LlmError::TomlParse(_) => LlmError::ConfigError("TOML parse error (mock)".to_string()),
        LlmError::TomlSerialize(_) => {
            LlmError::ConfigError("TOML serialize error (mock)".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> LlmRequest {
        LlmRequest {
            prompt: prompt.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds("success");

        let result = provider.complete(request("test")).await;
        assert_eq!(result.unwrap().content, "success");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails(LlmError::ServerOverloaded {
            message: "overloaded".to_string(),
        });

        for _ in 0..3 {
            assert!(provider.complete(request("test")).await.is_err());
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_then_succeeds() {
        let provider = MockProvider::fails_then_succeeds(
            1,
            LlmError::RateLimited {
                retry_after: Some(3),
            },
            "success",
        );

        let first = provider.complete(request("a")).await;
        assert!(matches!(
            first,
            Err(LlmError::RateLimited {
                retry_after: Some(3)
            })
        ));

        let second = provider.complete(request("b")).await;
        assert_eq!(second.unwrap().content, "success");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_records_last_request() {
        let provider = MockProvider::always_succeeds("{}");
        assert!(provider.last_request().is_none());

        provider.complete(request("first")).await.unwrap();
        provider.complete(request("second")).await.unwrap();

        assert_eq!(provider.last_request().unwrap().prompt, "second");
    }
}
