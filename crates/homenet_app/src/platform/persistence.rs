use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};
use homenet_engine::{AtomicFileWriter, ClientSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub(crate) const PREFS_FILENAME: &str = ".homenet_prefs.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` disables the connect timeout.
    pub connect_timeout_secs: Option<u64>,
    pub max_response_bytes: u64,
    pub log_to: LogDestination,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            connect_timeout_secs: Some(10),
            max_response_bytes: 5 * 1024 * 1024,
            log_to: LogDestination::File,
        }
    }
}

impl ClientConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            max_bytes: self.max_response_bytes,
        }
    }
}

/// Reads the client config. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ClientConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedPrefs {
    #[serde(default)]
    log_levels: BTreeMap<String, String>,
}

/// Per-page log-level preferences, kept in a small RON file.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
    prefs: PersistedPrefs,
}

impl PrefsStore {
    /// Loads the store; unreadable or corrupt files start it empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match fs::read_to_string(&path) {
            Ok(text) => match ron::from_str(&text) {
                Ok(prefs) => prefs,
                Err(err) => {
                    engine_warn!("Failed to parse preferences from {:?}: {}", path, err);
                    PersistedPrefs::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => PersistedPrefs::default(),
            Err(err) => {
                engine_warn!("Failed to read preferences from {:?}: {}", path, err);
                PersistedPrefs::default()
            }
        };
        Self { path, prefs }
    }

    pub fn log_level(&self, key: &str) -> Option<&str> {
        self.prefs.log_levels.get(key).map(String::as_str)
    }

    /// Stores the value and writes the file if it changed.
    pub fn set_log_level(&mut self, key: &str, value: &str) {
        if self.log_level(key) == Some(value) {
            return;
        }
        self.prefs
            .log_levels
            .insert(key.to_string(), value.to_string());
        self.save();
    }

    fn save(&self) {
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&self.prefs, pretty) {
            Ok(text) => text,
            Err(err) => {
                engine_error!("Failed to serialize preferences: {}", err);
                return;
            }
        };
        match AtomicFileWriter::new(&self.path).write(&content) {
            Ok(()) => engine_info!("Saved preferences to {:?}", self.path),
            Err(err) => engine_error!("Failed to write preferences to {:?}: {}", self.path, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::{load_config, ClientConfig, ConfigError, PrefsStore, PREFS_FILENAME};
    use crate::platform::logging::LogDestination;

    #[test]
    fn missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("client.ron");
        fs::write(
            &path,
            r#"(base_url: "http://nas.local:8080", connect_timeout_secs: None, log_to: both)"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.base_url, "http://nas.local:8080");
        assert_eq!(config.connect_timeout_secs, None);
        assert_eq!(config.log_to, LogDestination::Both);
        assert_eq!(config.max_response_bytes, 5 * 1024 * 1024);
        assert_eq!(config.client_settings().connect_timeout, None);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("client.ron");
        fs::write(&path, "(base_url: 42").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn log_levels_persist_per_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PREFS_FILENAME);

        let mut store = PrefsStore::load(&path);
        assert_eq!(store.log_level("ai_log_level"), None);
        store.set_log_level("ai_log_level", "DEBUG");
        store.set_log_level("movie_board_log_level", "WARN");

        let reloaded = PrefsStore::load(&path);
        assert_eq!(reloaded.log_level("ai_log_level"), Some("DEBUG"));
        assert_eq!(reloaded.log_level("movie_board_log_level"), Some("WARN"));
        assert_eq!(reloaded.log_level("tv_shows_board_log_level"), None);
    }

    #[test]
    fn corrupt_prefs_start_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PREFS_FILENAME);
        fs::write(&path, "not ron at all {").unwrap();
        let store = PrefsStore::load(&path);
        assert_eq!(store.log_level("ai_log_level"), None);
    }
}
