//! Persisted user settings

use crate::engine::CoordinatorOptions;
use directories::ProjectDirs;
use repcue_core::Language;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Language tag for spoken cues, e.g. "en" or "pt-BR"
    pub language: String,
    pub poll_interval_ms: u64,
    pub completion_grace_ms: u64,
    pub colored_voice: bool,
}

impl Default for Config {
    fn default() -> Self {
        let options = CoordinatorOptions::default();
        Self {
            language: Language::default().tag().to_string(),
            poll_interval_ms: options.poll_interval_ms,
            completion_grace_ms: options.completion_grace_ms,
            colored_voice: true,
        }
    }
}

impl Config {
    /// Cue language, falling back to English for unknown tags
    pub fn language(&self) -> Language {
        Language::from_tag(&self.language).unwrap_or_else(|| {
            warn!(tag = %self.language, "Unknown language tag, using English");
            Language::English
        })
    }

    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            // A zero interval would poll in a tight loop
            poll_interval_ms: self.poll_interval_ms.max(1),
            completion_grace_ms: self.completion_grace_ms,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "repcue") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("repcue_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %self.path.display(), "No config loaded: {}", e);
                return Config::default();
            }
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), "Ignoring malformed config: {}", e);
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested/deeper/config.json"));
        let cfg = Config {
            language: "es".to_string(),
            poll_interval_ms: 50,
            completion_grace_ms: 250,
            colored_voice: false,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_or_malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "language": "de" }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.language(), Language::German);
        assert_eq!(cfg.poll_interval_ms, 100);
        assert_eq!(cfg.completion_grace_ms, 1000);
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let cfg = Config {
            language: "xx".to_string(),
            ..Config::default()
        };
        assert_eq!(cfg.language(), Language::English);
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let cfg = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(cfg.coordinator_options().poll_interval_ms, 1);
    }
}
