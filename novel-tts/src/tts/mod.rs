//! TTS backend trait and provider selection.

pub mod dispatch;
pub mod doubao;
pub mod minimax;

pub use dispatch::{Dispatcher, write_script};

use async_trait::async_trait;

use crate::config::{EnvLookup, NovelTtsConfig};
use crate::error::Result;
use crate::voice::VoiceProvider;

/// TTS backend trait - every synthesis provider implements this.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize `text` with the provider voice `voice_handle`, returning encoded audio.
    async fn synthesize(&self, text: &str, voice_handle: &str) -> Result<Vec<u8>>;

    /// Provider this backend talks to.
    fn provider(&self) -> VoiceProvider;

    /// File extension of the returned audio.
    fn extension(&self) -> &'static str {
        "mp3"
    }
}

/// Create the backend for `provider`. Credentials missing from `config` are read from `env`.
pub fn create_backend(
    provider: VoiceProvider,
    config: &NovelTtsConfig,
    env: EnvLookup<'_>,
) -> Result<Box<dyn TtsBackend>> {
    Ok(match provider {
        VoiceProvider::Minimax => Box::new(minimax::MinimaxBackend::new(&config.minimax, env)?),
        VoiceProvider::Doubao => Box::new(doubao::DoubaoBackend::new(&config.doubao, env)?),
    })
}
