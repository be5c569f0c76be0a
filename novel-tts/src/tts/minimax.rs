//! MiniMax T2A v2 backend.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::TtsBackend;
use crate::config::{EnvLookup, MinimaxSettings, credential};
use crate::error::{PipelineError, Result};
use crate::voice::VoiceProvider;

const SAMPLE_RATE: u32 = 32000;
const BITRATE: u32 = 128000;

pub struct MinimaxBackend {
    endpoint: String,
    api_key: String,
    model: String,
    speed: f32,
    vol: f32,
    pitch: i32,
    emotion: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct T2aRequest<'a> {
    model: &'a str,
    text: &'a str,
    voice_setting: VoiceSetting<'a>,
    audio_setting: AudioSetting,
}

#[derive(Debug, Serialize)]
struct VoiceSetting<'a> {
    voice_id: &'a str,
    speed: f32,
    vol: f32,
    pitch: i32,
    emotion: &'a str,
}

#[derive(Debug, Serialize)]
struct AudioSetting {
    sample_rate: u32,
    bitrate: u32,
    format: &'static str,
    channel: u8,
}

#[derive(Debug, Deserialize)]
struct T2aResponse {
    data: Option<T2aData>,
    base_resp: Option<BaseResp>,
}

#[derive(Debug, Deserialize)]
struct T2aData {
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BaseResp {
    status_code: i64,
    #[serde(default)]
    status_msg: String,
}

impl MinimaxBackend {
    /// Build from settings, filling unset credentials from `env`.
    pub fn new(settings: &MinimaxSettings, env: EnvLookup<'_>) -> Result<Self> {
        let provider = VoiceProvider::Minimax;
        let api_url = credential(
            settings.api_url.as_deref(),
            provider,
            "API URL",
            "MINIMAXI_API_URL",
            env,
        )?;
        let group_id = credential(
            settings.group_id.as_deref(),
            provider,
            "Group ID",
            "MINIMAXI_GROUP_ID",
            env,
        )?;
        let api_key = credential(
            settings.api_key.as_deref(),
            provider,
            "API key",
            "MINIMAXI_API_KEY",
            env,
        )?;

        Ok(Self {
            endpoint: format!(
                "{}/t2a_v2?GroupId={}",
                api_url.trim_end_matches('/'),
                group_id
            ),
            api_key,
            model: settings.model.clone(),
            speed: settings.speed,
            vol: settings.vol,
            pitch: settings.pitch,
            emotion: settings.emotion.clone(),
            client: Client::new(),
        })
    }

    fn build_request<'a>(&'a self, text: &'a str, voice_id: &'a str) -> T2aRequest<'a> {
        T2aRequest {
            model: &self.model,
            text,
            voice_setting: VoiceSetting {
                voice_id,
                speed: self.speed,
                vol: self.vol,
                pitch: self.pitch,
                emotion: &self.emotion,
            },
            audio_setting: AudioSetting {
                sample_rate: SAMPLE_RATE,
                bitrate: BITRATE,
                format: "mp3",
                channel: 1,
            },
        }
    }
}

fn synthesis_error(message: impl Into<String>) -> PipelineError {
    PipelineError::Synthesis {
        provider: VoiceProvider::Minimax,
        message: message.into(),
    }
}

/// Pull the audio out of a T2A response envelope.
fn decode_envelope(body: &str) -> Result<Vec<u8>> {
    let response: T2aResponse = serde_json::from_str(body)
        .map_err(|e| synthesis_error(format!("invalid response: {}", e)))?;

    if let Some(base) = &response.base_resp {
        if base.status_code != 0 {
            return Err(synthesis_error(format!(
                "status {}: {}",
                base.status_code, base.status_msg
            )));
        }
    }

    let audio = response
        .data
        .and_then(|d| d.audio)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| synthesis_error("response has no audio"))?;

    hex::decode(&audio).map_err(|e| synthesis_error(format!("audio is not valid hex: {}", e)))
}

#[async_trait]
impl TtsBackend for MinimaxBackend {
    async fn synthesize(&self, text: &str, voice_handle: &str) -> Result<Vec<u8>> {
        debug!("MiniMax synthesis: voice={} chars={}", voice_handle, text.chars().count());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
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
        VoiceProvider::Minimax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MinimaxBackend {
        let settings = MinimaxSettings {
            api_url: Some("https://api.minimax.example/v1/".to_string()),
            group_id: Some("42".to_string()),
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        MinimaxBackend::new(&settings, &|_: &str| None).unwrap()
    }

    #[test]
    fn test_endpoint_includes_group() {
        assert_eq!(
            backend().endpoint,
            "https://api.minimax.example/v1/t2a_v2?GroupId=42"
        );
    }

    #[test]
    fn test_request_body() {
        let backend = backend();
        let body = serde_json::to_value(backend.build_request("你好", "female-shaonv")).unwrap();

        assert_eq!(body["model"], "speech-02-hd");
        assert_eq!(body["text"], "你好");
        assert_eq!(body["voice_setting"]["voice_id"], "female-shaonv");
        assert_eq!(body["voice_setting"]["emotion"], "calm");
        assert_eq!(body["voice_setting"]["pitch"], 0);
        assert_eq!(body["audio_setting"]["sample_rate"], 32000);
        assert_eq!(body["audio_setting"]["bitrate"], 128000);
        assert_eq!(body["audio_setting"]["format"], "mp3");
        assert_eq!(body["audio_setting"]["channel"], 1);
    }

    #[test]
    fn test_decode_envelope() {
        let body = r#"{"data":{"audio":"49443303ff"},"base_resp":{"status_code":0,"status_msg":"success"}}"#;
        assert_eq!(
            decode_envelope(body).unwrap(),
            vec![0x49, 0x44, 0x33, 0x03, 0xff]
        );
    }

    #[test]
    fn test_decode_envelope_status_error() {
        let body = r#"{"data":null,"base_resp":{"status_code":1004,"status_msg":"auth failed"}}"#;
        let err = decode_envelope(body).unwrap_err();
        assert!(err.to_string().contains("1004"));
        assert!(err.to_string().contains("auth failed"));
    }

    #[test]
    fn test_decode_envelope_missing_audio() {
        let err = decode_envelope(r#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, PipelineError::Synthesis { .. }));
    }

    #[test]
    fn test_decode_envelope_bad_hex() {
        let body = r#"{"data":{"audio":"4944zz"},"base_resp":{"status_code":0}}"#;
        let err = decode_envelope(body).unwrap_err();
        assert!(err.to_string().contains("not valid hex"));
    }
}
