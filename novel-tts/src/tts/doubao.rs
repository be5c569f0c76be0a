//! Doubao (Volcano Engine) TTS backend.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TtsBackend;
use crate::config::{DoubaoSettings, EnvLookup, credential};
use crate::error::{PipelineError, Result};
use crate::voice::VoiceProvider;

/// Response code for a successful synthesis.
const SUCCESS_CODE: i64 = 3000;

/// Placeholder for `app.token`; the access token travels in the `Authorization: Bearer;` header.
const APP_TOKEN_PLACEHOLDER: &str = "api_key";

pub struct DoubaoBackend {
    api_url: String,
    api_key: String,
    app_id: String,
    cluster: String,
    speed_ratio: f32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    app: App<'a>,
    user: User,
    audio: Audio<'a>,
    request: RequestBody<'a>,
}

#[derive(Debug, Serialize)]
struct App<'a> {
    appid: &'a str,
    token: &'a str,
    cluster: &'a str,
}

#[derive(Debug, Serialize)]
struct User {
    uid: &'static str,
}

#[derive(Debug, Serialize)]
struct Audio<'a> {
    voice_type: &'a str,
    encoding: &'static str,
    speed_ratio: f32,
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    reqid: String,
    text: &'a str,
    operation: &'static str,
}

#[derive(Debug, Deserialize)]
struct TtsResponse {
    code: Option<i64>,
    #[serde(default)]
    message: String,
    data: Option<String>,
}

impl DoubaoBackend {
    /// Build from settings, filling unset credentials from `env`.
    pub fn new(settings: &DoubaoSettings, env: EnvLookup<'_>) -> Result<Self> {
        let provider = VoiceProvider::Doubao;

        Ok(Self {
            api_url: credential(
                settings.api_url.as_deref(),
                provider,
                "API URL",
                "DOUBAO_API_URL",
                env,
            )?,
            api_key: credential(
                settings.api_key.as_deref(),
                provider,
                "API key",
                "DOUBAO_API_KEY",
                env,
            )?,
            app_id: credential(
                settings.app_id.as_deref(),
                provider,
                "App ID",
                "DOUBAO_APPID",
                env,
            )?,
            cluster: settings.cluster.clone(),
            speed_ratio: settings.speed_ratio,
            client: Client::new(),
        })
    }

    fn build_request<'a>(&'a self, text: &'a str, voice_type: &'a str) -> TtsRequest<'a> {
        TtsRequest {
            app: App {
                appid: &self.app_id,
                token: APP_TOKEN_PLACEHOLDER,
                cluster: &self.cluster,
            },
            user: User { uid: "novel-tts" },
            audio: Audio {
                voice_type,
                encoding: "mp3",
                speed_ratio: self.speed_ratio,
            },
            request: RequestBody {
                reqid: Uuid::new_v4().to_string(),
                text,
                operation: "query",
            },
        }
    }
}

fn synthesis_error(message: impl Into<String>) -> PipelineError {
    PipelineError::Synthesis {
        provider: VoiceProvider::Doubao,
        message: message.into(),
    }
}

/// Pull the audio out of a Doubao response envelope.
fn decode_envelope(body: &str) -> Result<Vec<u8>> {
    let response: TtsResponse = serde_json::from_str(body)
        .map_err(|e| synthesis_error(format!("invalid response: {}", e)))?;

    if let Some(code) = response.code {
        if code != SUCCESS_CODE {
            return Err(synthesis_error(format!("code {}: {}", code, response.message)));
        }
    }

    let audio = response
        .data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| synthesis_error("response has no audio"))?;

    STANDARD
        .decode(audio)
        .map_err(|e| synthesis_error(format!("audio is not valid base64: {}", e)))
}

#[async_trait]
impl TtsBackend for DoubaoBackend {
    async fn synthesize(&self, text: &str, voice_handle: &str) -> Result<Vec<u8>> {
        debug!("Doubao synthesis: voice={} chars={}", voice_handle, text.chars().count());

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer;{}", self.api_key))
            .json(&self.build_request(text, voice_handle))
            .send()
            .await
            .map_err(|e| synthesis_error(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| synthesis_error(e.to_string()))?;

        if !status.is_success() {
            return Err(synthesis_error(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        decode_envelope(&body)
    }

    fn provider(&self) -> VoiceProvider {
        VoiceProvider::Doubao
    }
}
