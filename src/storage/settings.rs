//! Per-tool settings, one JSON document per `SettingsKind`.
//!
//! The file is a single JSON object keyed by kind. Stored documents are
//! opaque here; callers pick the type when reading back.

use anyhow::{Context, Result};
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Settings slots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsKind {
    ImageGeneration,
    AnimationGeneration,
    ChiptuneGeneration,
    FramePreview,
}

impl SettingsKind {
    pub fn key(self) -> &'static str {
        match self {
            SettingsKind::ImageGeneration => "image_generation",
            SettingsKind::AnimationGeneration => "animation_generation",
            SettingsKind::ChiptuneGeneration => "chiptune_generation",
            SettingsKind::FramePreview => "frame_preview",
        }
    }
}

impl std::str::FromStr for SettingsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image_generation" | "image" => Ok(SettingsKind::ImageGeneration),
            "animation_generation" | "animation" => Ok(SettingsKind::AnimationGeneration),
            "chiptune_generation" | "chiptune" => Ok(SettingsKind::ChiptuneGeneration),
            "frame_preview" | "preview" => Ok(SettingsKind::FramePreview),
            other => Err(format!("Unknown settings kind: {}", other)),
        }
    }
}

/// File-backed settings documents
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    docs: BTreeMap<String, serde_json::Value>,
}

impl SettingsStore {
    /// Load from `path`; missing or corrupt file yields no settings.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let docs = if path.exists() {
            std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|raw| Ok(serde_json::from_str(&raw)?))
                .unwrap_or_else(|e| {
                    error!("Failed to read settings {}: {:#}", path.display(), e);
                    BTreeMap::new()
                })
        } else {
            BTreeMap::new()
        };
        Self { path, docs }
    }

    /// Raw stored document
    pub fn get_raw(&self, kind: SettingsKind) -> Option<&serde_json::Value> {
        self.docs.get(kind.key())
    }

    /// Stored document decoded as `T`; a document of the wrong shape reads as None.
    pub fn get<T: DeserializeOwned>(&self, kind: SettingsKind) -> Option<T> {
        let raw = self.get_raw(kind)?;
        match serde_json::from_value(raw.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring stored {} settings: {}", kind.key(), e);
                None
            }
        }
    }

    pub fn save<T: Serialize>(&mut self, kind: SettingsKind, value: &T) -> Result<()> {
        let doc = serde_json::to_value(value)?;
        self.docs.insert(kind.key().to_string(), doc);
        self.persist()
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.docs.clear();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.docs)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write settings {}", self.path.display()))
    }
}
