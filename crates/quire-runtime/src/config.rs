#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! [`QuireConfig`] groups every tunable of the runtime and loads from TOML or
//! JSON. Missing sections and fields fall back to their defaults, so an
//! empty file yields [`QuireConfig::default`].
//!
//! ```toml
//! [recent_files]
//! limit = 30
//! storage_key = "notes-recent-files"
//!
//! [storage]
//! path = "/home/me/.local/share/quire/storage.json"
//!
//! [logging]
//! filter = "info"
//! json = false
//!
//! [dialog]
//! default_save_stem = "note"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bound of the recent-files list.
pub const DEFAULT_RECENT_LIMIT: usize = 30;

/// Default storage key of the recent-files list.
pub const DEFAULT_RECENT_KEY: &str = "notes-recent-files";

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuireConfig {
    pub recent_files: RecentFilesConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub dialog: DialogConfig,
}

/// Recent-files list settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentFilesConfig {
    /// Maximum number of entries kept.
    pub limit: usize,
    /// Key under which the list is persisted.
    pub storage_key: String,
}

impl Default for RecentFilesConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RECENT_LIMIT,
            storage_key: DEFAULT_RECENT_KEY.to_string(),
        }
    }
}

/// Durable storage location. `None` keeps state in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Native dialog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// File stem suggested by the save dialog (`note` -> `note.html`).
    pub default_save_stem: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            default_save_stem: "note".to_string(),
        }
    }
}

impl QuireConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a file, picking the format from its extension (`.json` or TOML),
    /// and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let content = std::fs::read_to_string(path)?;
        let config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        config.validated()
    }

    /// Every violated constraint; empty when the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.recent_files.limit == 0 {
            errors.push("recent_files.limit must be > 0".to_string());
        }
        if self.recent_files.storage_key.trim().is_empty() {
            errors.push("recent_files.storage_key must not be blank".to_string());
        }
        if self.logging.filter.trim().is_empty() {
            errors.push("logging.filter must not be blank".to_string());
        }
        if !quire_text::validate_file_name(&self.dialog.default_save_stem) {
            errors.push(format!(
                "dialog.default_save_stem is not a valid file name: {:?}",
                self.dialog.default_save_stem
            ));
        }
        errors
    }

    /// `self` when valid, otherwise [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = QuireConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.recent_files.limit, 30);
        assert_eq!(config.recent_files.storage_key, "notes-recent-files");
        assert_eq!(config.dialog.default_save_stem, "note");
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(QuireConfig::from_toml_str("").ok(), Some(QuireConfig::default()));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = QuireConfig::from_toml_str(
            r#"
            [recent_files]
            limit = 5

            [logging]
            json = true
            "#,
        )
        .expect("parse");
        assert_eq!(config.recent_files.limit, 5);
        assert_eq!(config.recent_files.storage_key, DEFAULT_RECENT_KEY);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn json_round_trip() {
        let mut config = QuireConfig::default();
        config.storage.path = Some(PathBuf::from("/tmp/quire.json"));
        let json = serde_json::to_string(&config).expect("serialize");
        assert_eq!(QuireConfig::from_json_str(&json).expect("parse"), config);
    }

    #[test]
    fn validation_reports_every_problem() {
        let mut config = QuireConfig::default();
        config.recent_files.limit = 0;
        config.dialog.default_save_stem = "a/b".to_string();
        let errors = config.clone().validate();
        assert_eq!(errors.len(), 2);
        assert!(matches!(config.validated(), Err(ConfigError::Validation(e)) if e.len() == 2));
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(matches!(
            QuireConfig::from_toml_str("[recent_files]\nlimit = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let toml_path = dir.path().join("quire.toml");
        std::fs::write(&toml_path, "[dialog]\ndefault_save_stem = \"draft\"\n").expect("write");
        let json_path = dir.path().join("quire.json");
        std::fs::write(&json_path, r#"{"recent_files":{"limit":3}}"#).expect("write");

        assert_eq!(
            QuireConfig::load(&toml_path).expect("toml").dialog.default_save_stem,
            "draft"
        );
        assert_eq!(QuireConfig::load(&json_path).expect("json").recent_files.limit, 3);
        assert!(matches!(
            QuireConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
