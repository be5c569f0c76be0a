//! Sequential synthesis of merged records.

use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::TtsBackend;
use crate::error::{PipelineError, Result};
use crate::pipeline::MergedRecord;
use crate::voice::VoiceProvider;

pub const SCRIPT_FILE: &str = "script.json";

/// Sends records to their provider's backend, one request at a time.
pub struct Dispatcher {
    backends: HashMap<VoiceProvider, Box<dyn TtsBackend>>,
    pause: Duration,
}

impl Dispatcher {
    /// Create a dispatcher that waits `pause` after every synthesis request.
    pub fn new(pause: Duration) -> Self {
        Self {
            backends: HashMap::new(),
            pause,
        }
    }

    /// Register a backend for its provider, replacing any previous one.
    pub fn with_backend(mut self, backend: Box<dyn TtsBackend>) -> Self {
        self.backends.insert(backend.provider(), backend);
        self
    }

    /// Synthesize every record in order and write `{segment_id}.{ext}` files.
    ///
    /// The first failure stops the run; later records are never attempted.
    /// `on_written` is called after each file lands on disk.
    pub async fn dispatch<F>(
        &self,
        records: &[MergedRecord],
        output_dir: &Path,
        mut on_written: F,
    ) -> Result<Vec<PathBuf>>
    where
        F: FnMut(&MergedRecord, &Path),
    {
        tokio::fs::create_dir_all(output_dir).await?;

        let mut written = Vec::with_capacity(records.len());
        for record in records {
            let missing = || PipelineError::MissingVoice {
                segment_id: record.segment_id,
                speaker: record.speaker.clone(),
            };
            let voice = record.voice_info.as_ref().ok_or_else(missing)?;
            let handle = voice.voice_handle.as_deref().ok_or_else(missing)?;

            let backend = self
                .backends
                .get(&voice.voice_source)
                .ok_or(PipelineError::NoBackend(voice.voice_source))?;

            debug!(
                "Synthesizing segment {} as '{}' ({})",
                record.segment_id, voice.voice_name, handle
            );
            let audio = backend.synthesize(&record.content, handle).await?;

            let path = output_dir.join(format!("{}.{}", record.segment_id, backend.extension()));
            tokio::fs::write(&path, &audio).await?;
            on_written(record, &path);
            written.push(path);

            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        info!("Wrote {} audio files to {}", written.len(), output_dir.display());
        Ok(written)
    }
}

/// Write the merged records as `script.json` in `dir`.
pub fn write_script(dir: &Path, records: &[MergedRecord]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(SCRIPT_FILE);
    let content = serde_json::to_string_pretty(records)?;
    std::fs::write(&path, content)?;
    Ok(path)
}
