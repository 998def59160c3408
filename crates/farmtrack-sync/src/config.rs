//! # Application Configuration
//!
//! Session configuration loaded from a TOML file with environment overrides.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Configuration Resolution                            │
//! │                                                                         │
//! │   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────┐ │
//! │   │   Built-in   │──►│  TOML file   │──►│ FARMTRACK_*  │──►│validate │ │
//! │   │   defaults   │   │ (if present) │   │ env overrides│   │         │ │
//! │   └──────────────┘   └──────────────┘   └──────────────┘   └─────────┘ │
//! │                                                                         │
//! │   Default file location:                                                │
//! │     <platform config dir>/farmtrack/farmtrack.toml                      │
//! │     e.g. ~/.config/farmtrack/farmtrack.toml on Linux                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Offline Switch
//!
//! `offline` selects the storage backend for the whole session:
//! - `true`  → snapshots live in a JSON file under the data directory
//! - `false` → snapshots live in the per-user remote document
//!
//! The switch is read once at session start. Flipping it requires a restart,
//! which keeps backend selection out of the sync hot path.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use farmtrack_store::RemoteConfig;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Defaults
// =============================================================================

fn default_offline() -> bool {
    true
}

fn default_base_url() -> String {
    "http://localhost:8787".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_debounce_ms() -> u64 {
    1_000
}

fn default_saved_hold_ms() -> u64 {
    2_000
}

fn default_offline_hold_ms() -> u64 {
    800
}

// =============================================================================
// Configuration Sections
// =============================================================================

/// Remote document service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL of the document service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional bearer token sent with every request.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Interval between change polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Sync agent tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Quiet period after the last edit before a flush, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long the Saved status is held before returning to Idle.
    #[serde(default = "default_saved_hold_ms")]
    pub saved_hold_ms: u64,

    /// How long the Offline status is held after a local-only flush.
    #[serde(default = "default_offline_hold_ms")]
    pub offline_hold_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            saved_hold_ms: default_saved_hold_ms(),
            offline_hold_ms: default_offline_hold_ms(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Session configuration.
///
/// ## Example TOML
/// ```toml
/// offline = false
/// user_id = "farm-owner-1"
///
/// [remote]
/// base_url = "https://sync.farmtrack.app"
/// auth_token = "secret"
///
/// [sync]
/// debounce_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Work entirely from the local snapshot file.
    #[serde(default = "default_offline")]
    pub offline: bool,

    /// User identifier naming the per-user remote document.
    /// Required when `offline` is false.
    #[serde(default)]
    pub user_id: String,

    /// Override for the local data directory. When unset, the platform
    /// data directory is used.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Remote document service settings.
    #[serde(default)]
    pub remote: RemoteSettings,

    /// Sync agent tunables.
    #[serde(default)]
    pub sync: SyncSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            offline: default_offline(),
            user_id: String::new(),
            data_dir: None,
            remote: RemoteSettings::default(),
            sync: SyncSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the given path (or the default location),
    /// applies environment overrides, and validates the result.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> SyncResult<Self> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_config_path(),
        };

        let mut config = match resolved {
            Some(ref p) if p.exists() => {
                let text = std::fs::read_to_string(p)?;
                toml::from_str(&text)?
            }
            _ => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults on any failure.
    ///
    /// Failures are logged so a broken config file does not silently
    /// reconfigure the session.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Saves configuration as pretty TOML, creating parent directories.
    pub fn save(&self, path: Option<&Path>) -> SyncResult<()> {
        let resolved = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path().ok_or_else(|| {
                SyncError::ConfigSaveFailed("No config directory available".to_string())
            })?,
        };

        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let text = toml::to_string_pretty(self)?;
        std::fs::write(&resolved, text)?;
        Ok(())
    }

    /// Default config file location: `<config dir>/farmtrack/farmtrack.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "farmtrack", "farmtrack")
            .map(|dirs| dirs.config_dir().join("farmtrack.toml"))
    }

    /// Resolves the directory holding the local snapshot file.
    ///
    /// Order: explicit `data_dir` override, then the platform data
    /// directory, then `./farmtrack_data` as a last resort.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        ProjectDirs::from("com", "farmtrack", "farmtrack")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./farmtrack_data"))
    }

    // =========================================================================
    // Environment Overrides
    // =========================================================================

    /// Applies `FARMTRACK_*` environment overrides.
    ///
    /// Recognized variables:
    /// - `FARMTRACK_USE_OFFLINE`: `1/true/yes/on` or `0/false/no/off`
    /// - `FARMTRACK_USER_ID`
    /// - `FARMTRACK_BASE_URL`
    /// - `FARMTRACK_AUTH_TOKEN`
    /// - `FARMTRACK_DATA_DIR`
    /// - `FARMTRACK_DEBOUNCE_MS`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("FARMTRACK_USE_OFFLINE") {
            match parse_bool_flag(&value) {
                Some(flag) => self.offline = flag,
                None => warn!(value = %value, "Invalid FARMTRACK_USE_OFFLINE, ignoring"),
            }
        }

        if let Ok(value) = env::var("FARMTRACK_USER_ID") {
            if !value.trim().is_empty() {
                self.user_id = value.trim().to_string();
            }
        }

        if let Ok(value) = env::var("FARMTRACK_BASE_URL") {
            if !value.trim().is_empty() {
                self.remote.base_url = value.trim().to_string();
            }
        }

        if let Ok(value) = env::var("FARMTRACK_AUTH_TOKEN") {
            if !value.trim().is_empty() {
                self.remote.auth_token = Some(value.trim().to_string());
            }
        }

        if let Ok(value) = env::var("FARMTRACK_DATA_DIR") {
            if !value.trim().is_empty() {
                self.data_dir = Some(PathBuf::from(value.trim()));
            }
        }

        if let Ok(value) = env::var("FARMTRACK_DEBOUNCE_MS") {
            match value.parse::<u64>() {
                Ok(ms) => self.sync.debounce_ms = ms,
                Err(_) => warn!(value = %value, "Invalid FARMTRACK_DEBOUNCE_MS, ignoring"),
            }
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validates the configuration.
    ///
    /// ## Rules
    /// - Online sessions need a non-empty `user_id`
    /// - Online sessions need an absolute http(s) `base_url`
    /// - `debounce_ms` must be greater than zero
    pub fn validate(&self) -> SyncResult<()> {
        if self.sync.debounce_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "sync.debounce_ms must be greater than zero".to_string(),
            ));
        }

        if !self.offline {
            if self.user_id.trim().is_empty() {
                return Err(SyncError::InvalidConfig(
                    "user_id is required when offline is false".to_string(),
                ));
            }

            let parsed = Url::parse(&self.remote.base_url)?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(SyncError::InvalidUrl(format!(
                    "Unsupported scheme '{}', expected http or https",
                    parsed.scheme()
                )));
            }
        }

        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Debounce window for the sync agent.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.sync.debounce_ms)
    }

    /// How long the Saved status is held.
    pub fn saved_hold(&self) -> Duration {
        Duration::from_millis(self.sync.saved_hold_ms)
    }

    /// How long the Offline status is held.
    pub fn offline_hold(&self) -> Duration {
        Duration::from_millis(self.sync.offline_hold_ms)
    }

    /// Builds the remote store configuration for this session.
    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.remote.base_url.clone(),
            user_id: self.user_id.clone(),
            auth_token: self.remote.auth_token.clone(),
            poll_interval: Duration::from_millis(self.remote.poll_interval_ms),
            ..RemoteConfig::default()
        }
    }
}

/// Parses a boolean flag with the usual aliases.
fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.offline);
        assert!(config.user_id.is_empty());
        assert_eq!(config.sync.debounce_ms, 1_000);
        assert_eq!(config.sync.saved_hold_ms, 2_000);
        assert_eq!(config.sync.offline_hold_ms, 800);
        assert_eq!(config.remote.poll_interval_ms, 5_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_online_requires_user_id() {
        let config = AppConfig {
            offline: false,
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());

        let config = AppConfig {
            offline: false,
            user_id: "farm-owner-1".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_online_rejects_bad_base_url() {
        let mut config = AppConfig {
            offline: false,
            user_id: "farm-owner-1".to_string(),
            ..AppConfig::default()
        };

        config.remote.base_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidUrl(_))
        ));

        config.remote.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_zero_debounce_rejected() {
        let mut config = AppConfig::default();
        config.sync.debounce_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farmtrack.toml");

        let mut config = AppConfig::default();
        config.offline = false;
        config.user_id = "farm-owner-1".to_string();
        config.remote.base_url = "https://sync.farmtrack.app".to_string();
        config.remote.auth_token = Some("secret".to_string());
        config.sync.debounce_ms = 250;

        config.save(Some(&path)).unwrap();
        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "user_id = \"farm-owner-1\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.user_id, "farm-owner-1");
        assert!(config.offline);
        assert_eq!(config.sync.debounce_ms, 1_000);
    }

    #[test]
    fn test_bool_flag_aliases() {
        assert_eq!(parse_bool_flag("1"), Some(true));
        assert_eq!(parse_bool_flag("TRUE"), Some(true));
        assert_eq!(parse_bool_flag(" yes "), Some(true));
        assert_eq!(parse_bool_flag("0"), Some(false));
        assert_eq!(parse_bool_flag("off"), Some(false));
        assert_eq!(parse_bool_flag("maybe"), None);
    }

    #[test]
    fn test_remote_config_carries_settings() {
        let mut config = AppConfig::default();
        config.user_id = "farm-owner-1".to_string();
        config.remote.base_url = "https://sync.farmtrack.app".to_string();
        config.remote.auth_token = Some("secret".to_string());
        config.remote.poll_interval_ms = 9_000;

        let remote = config.remote_config();
        assert_eq!(remote.base_url, "https://sync.farmtrack.app");
        assert_eq!(remote.user_id, "farm-owner-1");
        assert_eq!(remote.auth_token.as_deref(), Some("secret"));
        assert_eq!(remote.poll_interval, Duration::from_millis(9_000));
    }
}
