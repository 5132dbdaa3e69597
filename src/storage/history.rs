//! Generation history, newest first, capped at `MAX_HISTORY_ITEMS`.
//!
//! Persisted as a JSON array. A missing or unreadable file is an empty
//! history (logged), never a startup failure.

use anyhow::{Context, Result};
use log::{error, trace};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Oldest items are dropped beyond this
pub const MAX_HISTORY_ITEMS: usize = 50;

/// What kind of media a history item points to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Animation,
    Chiptune,
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaKind::Image),
            "animation" => Ok(MediaKind::Animation),
            "chiptune" => Ok(MediaKind::Chiptune),
            other => Err(format!("Unknown media kind: {}", other)),
        }
    }
}

/// One successful generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: Uuid,
    /// Unix millis
    pub timestamp_ms: u64,
    pub kind: MediaKind,
    pub prompt: String,
    pub media_url: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl HistoryItem {
    /// New item stamped with a fresh id and the current time
    pub fn new(
        kind: MediaKind,
        prompt: impl Into<String>,
        media_url: impl Into<String>,
        params: serde_json::Value,
    ) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(millis)
            .unwrap_or(0);
        Self {
            id: Uuid::new_v4(),
            timestamp_ms,
            kind,
            prompt: prompt.into(),
            media_url: media_url.into(),
            params,
        }
    }
}

/// File-backed history list
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    items: Vec<HistoryItem>,
}

impl HistoryStore {
    /// Load from `path`; missing or corrupt file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match read_items(&path) {
            Ok(items) => items,
            Err(e) => {
                error!("Failed to read history {}: {:#}", path.display(), e);
                Vec::new()
            }
        };
        trace!("History loaded: {} items from {}", items.len(), path.display());
        Self { path, items }
    }

    /// Insert at the front, dropping the oldest when full, and persist.
    pub fn add(&mut self, item: HistoryItem) -> Result<()> {
        if self.items.len() >= MAX_HISTORY_ITEMS {
            self.items.truncate(MAX_HISTORY_ITEMS - 1);
        }
        self.items.insert(0, item);
        self.save()
    }

    /// Newest first
    pub fn all(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn by_kind(&self, kind: MediaKind) -> Vec<HistoryItem> {
        self.items.iter().filter(|i| i.kind == kind).cloned().collect()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.items.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.items)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write history {}", self.path.display()))
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn read_items(path: &Path) -> Result<Vec<HistoryItem>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("frameforge_history_{}.json", Uuid::new_v4()))
    }

    fn item(kind: MediaKind, n: usize) -> HistoryItem {
        HistoryItem::new(kind, format!("prompt {}", n), format!("https://cdn.example/{}", n), serde_json::Value::Null)
    }

    #[test]
    fn test_newest_first_and_capped() {
        let path = temp_path();
        let mut store = HistoryStore::load(&path);
        for n in 0..MAX_HISTORY_ITEMS + 5 {
            store.add(item(MediaKind::Image, n)).unwrap();
        }
        assert_eq!(store.len(), MAX_HISTORY_ITEMS);
        assert_eq!(store.all()[0].prompt, format!("prompt {}", MAX_HISTORY_ITEMS + 4));
        assert_eq!(store.all().last().unwrap().prompt, "prompt 5");

        let reloaded = HistoryStore::load(&path);
        assert_eq!(reloaded.all(), store.all());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_filter_by_kind() {
        let path = temp_path();
        let mut store = HistoryStore::load(&path);
        store.add(item(MediaKind::Image, 0)).unwrap();
        store.add(item(MediaKind::Chiptune, 1)).unwrap();
        store.add(item(MediaKind::Animation, 2)).unwrap();
        store.add(item(MediaKind::Chiptune, 3)).unwrap();

        let tunes = store.by_kind(MediaKind::Chiptune);
        assert_eq!(tunes.len(), 2);
        assert_eq!(tunes[0].prompt, "prompt 3");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_empty_history() {
        let path = temp_path();
        std::fs::write(&path, "{ not json").unwrap();
        let store = HistoryStore::load(&path);
        assert!(store.is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_clear_removes_file() {
        let path = temp_path();
        let mut store = HistoryStore::load(&path);
        store.add(item(MediaKind::Animation, 0)).unwrap();
        assert!(path.exists());
        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_timestamp_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1_700_000_000_123)), 1_700_000_000_123);
        assert_eq!(millis(Duration::MAX), u64::MAX);
        assert!(item(MediaKind::Image, 0).timestamp_ms > 0);
    }

    #[test]
    fn test_media_kind_parse() {
        assert_eq!("animation".parse::<MediaKind>(), Ok(MediaKind::Animation));
        assert!("video".parse::<MediaKind>().is_err());
    }
}
