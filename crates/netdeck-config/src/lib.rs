//! Shared configuration: profiles, credential resolution, and persisted
//! UI preferences.
//!
//! Configuration lives in a single TOML file (`netdeck/config.toml`
//! under the platform config directory), layered with `NETDECK_*`
//! environment variables via figment. API keys are resolved from the
//! profile first and the OS keyring second, so the file never has to
//! contain a secret.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot locate a configuration directory for this platform")]
    NoConfigDir,

    #[error("failed to read configuration: {0}")]
    Read(#[from] Box<figment::Error>),

    #[error("failed to write configuration to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no API key for profile '{profile}': set `api_key` in the config or store one in the OS keyring")]
    MissingApiKey { profile: String },

    #[error("keyring error for profile '{profile}': {source}")]
    Keyring {
        profile: String,
        source: keyring::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },
}

// ── Types ────────────────────────────────────────────────────────────

/// One named backend pair (lab server + dashboard service).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Lab server base URL, e.g. `http://127.0.0.1:3080`.
    pub server: String,
    /// Dashboard service base URL, e.g. `http://127.0.0.1:4000`.
    pub dashboard: String,
    /// Inline API key. Prefer the OS keyring; see [`resolve_api_key`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Accept invalid TLS certificates (self-signed lab servers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    /// Requested refresh interval; consumers clamp it to 1–30 s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval_secs: Option<u64>,
}

/// Persisted UI preferences. One key per preference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiPrefs {
    /// Selected theme name. Unrecognized or absent values fall back to
    /// the default theme at load time; the raw string is kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    #[serde(default)]
    pub ui: UiPrefs,
}

impl Config {
    /// The profile selected by `default_profile`, falling back to
    /// `"default"`, then to the only profile if exactly one exists.
    pub fn active_profile(&self) -> Option<(&str, &Profile)> {
        if let Some(name) = self.default_profile.as_deref() {
            return self.profiles.get_key_value(name).map(|(k, v)| (k.as_str(), v));
        }
        if let Some(p) = self.profiles.get("default") {
            return Some(("default", p));
        }
        if self.profiles.len() == 1 {
            return self.profiles.iter().next().map(|(k, v)| (k.as_str(), v));
        }
        None
    }
}

// ── Paths ────────────────────────────────────────────────────────────

/// Platform config file path, e.g. `~/.config/netdeck/config.toml`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dirs =
        directories::ProjectDirs::from("", "", "netdeck").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.toml"))
}

/// Platform data directory (log files live here).
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dirs =
        directories::ProjectDirs::from("", "", "netdeck").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.data_dir().to_path_buf())
}

// ── Load / save ──────────────────────────────────────────────────────

/// Load configuration from a specific file, layered with `NETDECK_*`
/// environment variables (`NETDECK_UI__THEME=paper` style nesting).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETDECK_").split("__"))
        .extract()
        .map_err(|e| ConfigError::Read(Box::new(e)))
}

/// Load from the default path; a missing file yields defaults.
pub fn load_config_or_default() -> Result<Config, ConfigError> {
    let path = config_path()?;
    load_config_from(&path)
}

/// Persist the configuration to a specific file.
pub fn save_config_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let body = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, body).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist the configuration to the default path.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    let path = config_path()?;
    save_config_to(config, &path)
}

// ── Credential resolution ────────────────────────────────────────────

const KEYRING_SERVICE: &str = "netdeck";

/// Resolve the API key for a profile: inline value first, then the OS
/// keyring entry `netdeck / <profile>.api_key`.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}.api_key")).map_err(
        |source| ConfigError::Keyring {
            profile: profile_name.to_owned(),
            source,
        },
    )?;

    match entry.get_password() {
        Ok(key) => Ok(SecretString::from(key)),
        Err(keyring::Error::NoEntry) => Err(ConfigError::MissingApiKey {
            profile: profile_name.to_owned(),
        }),
        Err(source) => Err(ConfigError::Keyring {
            profile: profile_name.to_owned(),
            source,
        }),
    }
}

/// Store an API key in the OS keyring for a profile.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}.api_key")).map_err(
        |source| ConfigError::Keyring {
            profile: profile_name.to_owned(),
            source,
        },
    )?;
    entry
        .set_password(key)
        .map_err(|source| ConfigError::Keyring {
            profile: profile_name.to_owned(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "lab".to_owned(),
            Profile {
                server: "http://127.0.0.1:3080".into(),
                dashboard: "http://127.0.0.1:4000".into(),
                api_key: None,
                insecure: Some(true),
                refresh_interval_secs: Some(5),
            },
        );
        Config {
            default_profile: Some("lab".into()),
            profiles,
            ui: UiPrefs {
                theme: Some("midnight".into()),
            },
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.profiles.is_empty());
        assert!(config.ui.theme.is_none());
    }

    #[test]
    fn save_and_load_round_trips_theme_preference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        save_config_to(&sample(), &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.ui.theme.as_deref(), Some("midnight"));
        assert_eq!(loaded.default_profile.as_deref(), Some("lab"));
        let (name, profile) = loaded.active_profile().unwrap();
        assert_eq!(name, "lab");
        assert_eq!(profile.refresh_interval_secs, Some(5));
    }

    #[test]
    fn active_profile_falls_back_to_sole_profile() {
        let mut config = sample();
        config.default_profile = None;
        let (name, _) = config.active_profile().unwrap();
        assert_eq!(name, "lab");
    }

    #[test]
    fn inline_api_key_wins_over_keyring() {
        let profile = Profile {
            server: String::new(),
            dashboard: String::new(),
            api_key: Some("abc123".into()),
            insecure: None,
            refresh_interval_secs: None,
        };
        let key = resolve_api_key(&profile, "lab").unwrap();
        use secrecy::ExposeSecret;
        assert_eq!(key.expose_secret(), "abc123");
    }
}
