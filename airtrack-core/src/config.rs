//! Store configuration and its file at `~/.airtrack/config.toml`.
//!
//! The store recognizes a single option, the staleness `timeout` in
//! milliseconds.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{Result, TrackError};

/// Forget aircraft not seen for two minutes.
pub const DEFAULT_TIMEOUT: u64 = 120_000;

/// Construction-time options for [`crate::store::AircraftStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Inactivity threshold in milliseconds.
    pub timeout: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl StoreConfig {
    pub fn with_timeout(timeout: u64) -> Self {
        StoreConfig { timeout }.normalized()
    }

    /// A zero timeout counts as unset and falls back to [`DEFAULT_TIMEOUT`].
    pub fn normalized(self) -> Self {
        if self.timeout == 0 {
            StoreConfig::default()
        } else {
            self
        }
    }
}

/// Get the config directory path (`~/.airtrack/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".airtrack")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.airtrack/config.toml`.
///
/// Returns the default config if the file doesn't exist.
pub fn load_config() -> Result<StoreConfig> {
    load_config_from(&config_file())
}

/// Load config from an explicit path. A missing file yields defaults; a file
/// that exists but does not parse is an error.
pub fn load_config_from(path: &Path) -> Result<StoreConfig> {
    if !path.exists() {
        return Ok(StoreConfig::default());
    }
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

/// Save config to the given path, creating parent directories.
pub fn save_config(config: &StoreConfig, path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let text = serialize_config(config)?;
    std::fs::write(path, text)?;
    Ok(path.to_path_buf())
}

fn parse_config(text: &str) -> Result<StoreConfig> {
    toml::from_str(text)
        .map(StoreConfig::normalized)
        .map_err(|e| TrackError::Config(e.to_string()))
}

fn serialize_config(config: &StoreConfig) -> Result<String> {
    let body = toml::to_string(config).map_err(|e| TrackError::Config(e.to_string()))?;
    Ok(format!("# airtrack configuration\n\n{body}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(StoreConfig::default().timeout, 120_000);
    }

    #[test]
    fn test_parse_config() {
        let config = parse_config("timeout = 50\n").unwrap();
        assert_eq!(config.timeout, 50);
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        assert_eq!(parse_config("timeout = 0\n").unwrap().timeout, DEFAULT_TIMEOUT);
        assert_eq!(StoreConfig::with_timeout(0).timeout, DEFAULT_TIMEOUT);
        assert_eq!(StoreConfig { timeout: 0 }.normalized(), StoreConfig::default());
        assert_eq!(StoreConfig::with_timeout(1).timeout, 1);
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = parse_config("# nothing set\n").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_parse_rejects_unknown_option() {
        let err = parse_config("timeout = 50\nwebhook = \"x\"\n").unwrap_err();
        assert!(matches!(err, TrackError::Config(_)));
    }

    #[test]
    fn test_parse_rejects_bad_type() {
        assert!(parse_config("timeout = \"soon\"\n").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let saved = save_config(&StoreConfig::with_timeout(30_000), &path).unwrap();
        assert_eq!(saved, path);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# airtrack configuration"));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.timeout, 30_000);
    }

    #[test]
    fn test_config_file_location() {
        assert!(config_file().ends_with(".airtrack/config.toml"));
    }
}
