#![deny(missing_docs)]
//! The Global config object (spec §6): `defaultTemperature`, `defaultMaxTokensRatio`,
//! `lastUsedAgent`, `lastUsedModel`, persisted in a user-scoped JSON file.
//!
//! Only the two defaults influence the core (`chorus-orchestrator`'s temperature/
//! max-tokens fallback, `chorus-catalog`'s seeding of refresher-created models); the
//! `last_used_*` fields are UI conveniences carried here because they share the same
//! file, but no core component reads them.
//!
//! Favors explicit `--config`/`--state-dir` path handling (load-if-present, default
//! otherwise) over a `ProjectDirs`-resolved path, since no `directories` crate is
//! otherwise needed in this workspace — the "caller passes the path" idiom, with
//! [`default_path`] as a convenience for callers who want the common
//! `$XDG_CONFIG_HOME`/`$HOME` resolution.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sampling temperature used when a [`chorus_core::Model`] leaves `temperature` unset
/// (spec §4.1 step 3).
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Fraction of `context_window` used when a [`chorus_core::Model`] leaves `max_tokens`
/// unset (spec §4.1 step 3).
pub const DEFAULT_MAX_TOKENS_RATIO: f64 = 0.25;

/// Global, user-scoped configuration (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    /// Fallback sampling temperature for models that leave it unset.
    pub default_temperature: f64,
    /// Fallback `max_tokens` ratio (of `context_window`) for models that leave it unset.
    pub default_max_tokens_ratio: f64,
    /// UI convenience: the agent id last selected in the frontend. Not read by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_agent: Option<String>,
    /// UI convenience: the model id last selected in the frontend. Not read by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_model: Option<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_temperature: DEFAULT_TEMPERATURE,
            default_max_tokens_ratio: DEFAULT_MAX_TOKENS_RATIO,
            last_used_agent: None,
            last_used_model: None,
        }
    }
}

/// Failure modes for loading/saving a [`GlobalConfig`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file existed but could not be parsed as a `GlobalConfig`.
    #[error("malformed config at {path}: {source}")]
    Malformed {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// An I/O failure reading or writing the config file.
    #[error("io error at {path}: {source}")]
    Io {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Load a [`GlobalConfig`] from `path`, or return the default if the file does not
/// exist (spec §6: a single configuration object persisted in a user-scoped JSON file).
pub async fn load(path: &Path) -> Result<GlobalConfig, ConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => serde_json::from_str(&contents).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file found, using defaults");
            Ok(GlobalConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persist a [`GlobalConfig`] to `path`, creating parent directories as needed.
pub async fn save(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
    }
    let contents = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// The conventional path for the global config file: `$XDG_CONFIG_HOME/chorus/config.json`,
/// falling back to `$HOME/.config/chorus/config.json`. Returns `None` if neither
/// environment variable is set — callers should fall back to an explicit `--config` flag
/// in that case.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join("chorus").join("config.json"));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("chorus").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_spec_constants() {
        let config = GlobalConfig::default();
        assert_eq!(config.default_temperature, 0.7);
        assert_eq!(config.default_max_tokens_ratio, 0.25);
        assert!(config.last_used_agent.is_none());
    }

    #[tokio::test]
    async fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = load(&path).await.unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = GlobalConfig::default();
        config.last_used_agent = Some("agent-1".into());
        config.last_used_model = Some("model-1".into());
        save(&path, &config).await.unwrap();
        let loaded = load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        let err = load(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn default_path_prefers_xdg_config_home() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/xdgcfg");
        let path = default_path().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/xdgcfg/chorus/config.json"));
        std::env::remove_var("XDG_CONFIG_HOME");
    }
}
