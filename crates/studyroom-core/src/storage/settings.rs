//! TOML-based user settings.
//!
//! Stores user preferences including:
//! - Study session length (25, 35 or 45 minutes)
//! - Background theme
//! - Alarm sound preferences
//! - Background music track
//! - Backend API location
//!
//! Settings are stored at `<data dir>/settings.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::data_dir;
use crate::error::ConfigError;
use crate::music;

/// Study lengths the user can pick, in minutes.
pub const ALLOWED_SESSION_MINUTES: [u32; 3] = [25, 35, 45];

/// Source of the study duration for the timer.
///
/// The timer reads it when it is built and again whenever the front end
/// reports a settings change.
pub trait SettingsProvider {
    fn study_minutes(&self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundTheme {
    #[default]
    Autumn,
    Storm,
}

/// Backend API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// User settings.
///
/// Serialized to/from TOML at `<data dir>/settings.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Study phase length in minutes.
    #[serde(default = "default_session_duration")]
    pub session_duration: u32,
    #[serde(default)]
    pub background_theme: BackgroundTheme,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_sound_type")]
    pub sound_type: String,
    #[serde(default = "default_background_music")]
    pub background_music: String,
    #[serde(default)]
    pub api: ApiConfig,
}

fn default_session_duration() -> u32 {
    25
}
fn default_true() -> bool {
    true
}
fn default_sound_type() -> String {
    "bell".into()
}
fn default_background_music() -> String {
    music::DEFAULT_MUSIC_ID.into()
}
fn default_base_url() -> String {
    "http://localhost:3000".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_duration: default_session_duration(),
            background_theme: BackgroundTheme::default(),
            sound_enabled: true,
            sound_type: default_sound_type(),
            background_music: default_background_music(),
            api: ApiConfig::default(),
        }
    }
}

impl SettingsProvider for Settings {
    fn study_minutes(&self) -> u32 {
        self.session_duration
    }
}

impl Settings {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                serde_json::Value::Object(_) => {
                    return Err(invalid("cannot replace a whole section".into()))
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
        }
        Ok(())
    }

    /// `<data dir>/settings.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("settings.toml"))
    }

    /// Load from the default location, writing defaults if the file is
    /// missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// Out-of-range values in an existing file are replaced by their
    /// defaults rather than rejected.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let settings: Settings =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                Ok(settings.sanitized())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.save_to(path)?;
                info!(path = %path.display(), "wrote default settings");
                Ok(settings)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "using default settings");
            Self::default()
        })
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a value as a string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. The new value keeps the type of the
    /// old one and must pass validation; on error nothing changes.
    ///
    /// Does not write to disk.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Settings = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ALLOWED_SESSION_MINUTES.contains(&self.session_duration) {
            return Err(ConfigError::InvalidValue {
                key: "session_duration".into(),
                message: format!(
                    "{} minutes; must be one of {:?}",
                    self.session_duration, ALLOWED_SESSION_MINUTES
                ),
            });
        }
        if music::find(&self.background_music).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "background_music".into(),
                message: format!("unknown track '{}'", self.background_music),
            });
        }
        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(ConfigError::InvalidValue {
                key: "api.base_url".into(),
                message: e.to_string(),
            });
        }
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !ALLOWED_SESSION_MINUTES.contains(&self.session_duration) {
            warn!(value = self.session_duration, "invalid session_duration in settings");
            self.session_duration = defaults.session_duration;
        }
        if music::find(&self.background_music).is_none() {
            warn!(value = %self.background_music, "invalid background_music in settings");
            self.background_music = defaults.background_music;
        }
        if url::Url::parse(&self.api.base_url).is_err() {
            warn!(value = %self.api.base_url, "invalid api.base_url in settings");
            self.api = defaults.api;
        }
        self
    }
}
