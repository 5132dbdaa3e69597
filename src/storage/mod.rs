//! Local persistence: generation history and per-tool settings.

pub mod history;
pub mod settings;

pub use history::{HistoryItem, HistoryStore, MAX_HISTORY_ITEMS, MediaKind};
pub use settings::{SettingsKind, SettingsStore};

/// History file name (data dir)
pub const HISTORY_FILE: &str = "frameforge_history.json";
/// Settings file name (config dir)
pub const SETTINGS_FILE: &str = "frameforge_settings.json";
