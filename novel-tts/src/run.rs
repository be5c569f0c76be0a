//! Run naming and output layout.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::voice::VoiceProvider;

/// Hash of the source text for run identification: first 16 hex characters of SHA256.
pub fn text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let result = hasher.finalize();

    format!("{:x}", result)[..16].to_string()
}

/// Default run name: `{text_hash}_{YYYYmmdd_HHMMSS}`.
pub fn run_name(text: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}", text_hash(text), timestamp)
}

/// Directory a run writes its script and audio to.
pub fn run_dir(output_root: &Path, provider: VoiceProvider, run_name: &str) -> PathBuf {
    output_root.join(provider.as_str()).join(run_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_hash() {
        let hash = text_hash("他说：“你好。”");
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, text_hash("他说：“你好。”"));
        assert_ne!(hash, text_hash("她回答：“再见。”"));
    }

    #[test]
    fn test_run_name_format() {
        let name = run_name("text");
        let (hash, timestamp) = name.split_at(16);
        assert_eq!(hash, text_hash("text"));
        assert!(timestamp.starts_with('_'));
        assert_eq!(timestamp.len(), "_20260101_120000".len());
    }

    #[test]
    fn test_run_dir_is_provider_scoped() {
        let dir = run_dir(Path::new("/out"), VoiceProvider::Doubao, "abc_20260101_120000");
        assert_eq!(dir, PathBuf::from("/out/doubao/abc_20260101_120000"));
    }
}
