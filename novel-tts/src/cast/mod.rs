//! The cast of a story and who speaks each segment.

pub mod roles;
pub mod speakers;

pub use roles::extract_roles;
pub use speakers::attribute_speakers;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A speaking character identified in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "flexible_id")]
    pub role_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Who speaks one segment. `None` means the oracle gave no speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerAssignment {
    #[serde(deserialize_with = "flexible_id")]
    pub segment_id: usize,
    #[serde(default)]
    pub speaker: Option<String>,
}

/// Accept ids written either as JSON numbers or as digit strings.
pub(crate) fn flexible_id<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId<T> {
        Number(T),
        Text(String),
    }

    match RawId::<T>::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}
