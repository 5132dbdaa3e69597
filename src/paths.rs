use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Application directory name under platform config/data roots
const APP_DIR: &str = "frameforge";

/// Files whose presence in the working directory makes it the config dir
const LOCAL_MARKERS: [&str; 3] = [
    "frameforge_settings.json",
    "frameforge_history.json",
    "frameforge.log",
];

/// Overrides for default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI arg → `FRAMEFORGE_CONFIG_DIR` → None (defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| {
            std::env::var("FRAMEFORGE_CONFIG_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });
        Self { config_dir }
    }
}

/// Path to a configuration file (settings).
///
/// Priority:
/// 1. `--config-dir` / `FRAMEFORGE_CONFIG_DIR`
/// 2. Current directory if it already holds frameforge files
/// 3. Platform config dir (dirs-next): `~/.config/frameforge/{name}` on Linux
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir).join(name)
}

/// Path to a data file (history, logs). Same priority as `config_file`,
/// falling back to the platform data dir: `~/.local/share/frameforge/{name}`.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir).join(name)
}

/// Directory holding data files (history, generated audio)
pub fn data_dir(config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir)
}

/// Create config and data directories if missing
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(config, dirs_next::config_dir);
    let data = data_dir(config);

    for dir in [&config_dir, &data] {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    LOCAL_MARKERS.iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform: fn() -> Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(cwd) = std::env::current_dir()
        && has_local_files(&cwd)
    {
        return cwd;
    }

    match platform() {
        Some(dir) => dir.join(APP_DIR),
        None => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_dir_wins() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };
        assert_eq!(
            config_file("frameforge_settings.json", &config),
            PathBuf::from("/custom/frameforge_settings.json")
        );
        assert_eq!(
            data_file("frameforge_history.json", &config),
            PathBuf::from("/custom/frameforge_history.json")
        );
    }

    #[test]
    fn test_cli_beats_env() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from-cli")));
        assert_eq!(config.config_dir, Some(PathBuf::from("/from-cli")));
    }

    #[test]
    fn test_platform_default_contains_app_dir() {
        let config = PathConfig::default();
        let path = data_file("frameforge_history.json", &config);
        assert!(path.ends_with("frameforge_history.json"));
    }

    #[test]
    fn test_ensure_dirs_creates_custom_dir() {
        let dir = std::env::temp_dir().join(format!("frameforge_paths_{}", uuid::Uuid::new_v4()));
        let config = PathConfig {
            config_dir: Some(dir.clone()),
        };
        ensure_dirs(&config).unwrap();
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
