//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default duration and the preset list
//! - Ambient sound directory, volume and fade shape
//! - Completion chime tone
//! - Breathing cue interval
//! - Theme override for hosts that cannot detect the system preference
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::breathing::DEFAULT_BREATH_INTERVAL_MS;
use crate::error::{ConfigError, CoreError, ValidationError};
use crate::sound::{ChimeTone, PlayerSettings};
use crate::timer::{Presets, DEFAULT_MINUTES};

/// Countdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,
}

/// Ambient sound configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Directory holding `rain.wav`, `forest.wav` and `waves.mp3`.
    /// Defaults to `<data_dir>/sounds`.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_volume")]
    pub default_volume: f64,
    #[serde(default = "default_fade_step")]
    pub fade_step: f64,
    #[serde(default = "default_fade_interval_ms")]
    pub fade_interval_ms: u64,
}

/// Completion chime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChimeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f64,
    #[serde(default = "default_peak_gain")]
    pub peak_gain: f64,
    #[serde(default = "default_attack_ms")]
    pub attack_ms: u64,
    #[serde(default = "default_decay_ms")]
    pub decay_ms: u64,
}

/// Breathing cue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathingConfig {
    #[serde(default = "default_breath_interval_ms")]
    pub interval_ms: u64,
}

/// UI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Overrides system dark-mode detection when set.
    #[serde(default)]
    pub prefers_dark: Option<bool>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub chime: ChimeConfig,
    #[serde(default)]
    pub breathing: BreathingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

// Default functions
fn default_minutes() -> u32 {
    DEFAULT_MINUTES
}
fn default_presets() -> Vec<u32> {
    Presets::default().minutes().to_vec()
}
fn default_volume() -> f64 {
    0.5
}
fn default_fade_step() -> f64 {
    0.05
}
fn default_fade_interval_ms() -> u64 {
    200
}
fn default_true() -> bool {
    true
}
fn default_frequency_hz() -> f64 {
    523.25
}
fn default_peak_gain() -> f64 {
    0.3
}
fn default_attack_ms() -> u64 {
    100
}
fn default_decay_ms() -> u64 {
    3000
}
fn default_breath_interval_ms() -> u64 {
    DEFAULT_BREATH_INTERVAL_MS
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            presets: default_presets(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            directory: None,
            default_volume: default_volume(),
            fade_step: default_fade_step(),
            fade_interval_ms: default_fade_interval_ms(),
        }
    }
}

impl Default for ChimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency_hz: default_frequency_hz(),
            peak_gain: default_peak_gain(),
            attack_ms: default_attack_ms(),
            decay_ms: default_decay_ms(),
        }
    }
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_breath_interval_ms(),
        }
    }
}

impl Config {
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
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Unset optional: take JSON literals as typed, anything else as text.
                    serde_json::Value::Null => serde_json::from_str(value)
                        .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable.
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed or the defaults
    /// cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// for that key, or the result fails validation. On error `self` is
    /// left unchanged.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save to the default location.
    ///
    /// # Errors
    /// Returns an error if [`Config::set_value`] fails or the config
    /// cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |field: &str, message: &str| ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        };

        Presets::new(self.timer.presets.clone())?;
        if self.timer.default_minutes == 0 {
            return Err(invalid("timer.default_minutes", "must be at least one minute"));
        }
        if !(0.0..=1.0).contains(&self.sound.default_volume) {
            return Err(invalid("sound.default_volume", "must be between 0 and 1"));
        }
        if !(self.sound.fade_step > 0.0 && self.sound.fade_step <= 1.0) {
            return Err(invalid("sound.fade_step", "must be in (0, 1]"));
        }
        if self.sound.fade_interval_ms == 0 {
            return Err(invalid("sound.fade_interval_ms", "must be positive"));
        }
        if self.breathing.interval_ms == 0 {
            return Err(invalid("breathing.interval_ms", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.chime.peak_gain) {
            return Err(invalid("chime.peak_gain", "must be between 0 and 1"));
        }
        if !(self.chime.frequency_hz.is_finite() && self.chime.frequency_hz > 0.0) {
            return Err(invalid("chime.frequency_hz", "must be a positive number"));
        }
        if self.chime.decay_ms <= self.chime.attack_ms {
            return Err(invalid("chime.decay_ms", "must be longer than chime.attack_ms"));
        }
        if Duration::from_millis(self.chime.decay_ms) > ChimeTone::MAX_LENGTH {
            return Err(invalid("chime.decay_ms", "must be at most 60000"));
        }
        Ok(())
    }

    /// The preset list, falling back to the defaults if it is invalid.
    pub fn presets(&self) -> Presets {
        Presets::new(self.timer.presets.clone()).unwrap_or_default()
    }

    /// Directory the ambient tracks are loaded from.
    ///
    /// # Errors
    /// Returns an error if no directory is configured and the data
    /// directory is unavailable.
    pub fn sound_directory(&self) -> Result<PathBuf, CoreError> {
        match &self.sound.directory {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Ok(data_dir()?.join("sounds")),
        }
    }

    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            volume: self.sound.default_volume as f32,
            fade_step: self.sound.fade_step as f32,
        }
    }

    pub fn fade_interval(&self) -> Duration {
        Duration::from_millis(self.sound.fade_interval_ms)
    }

    pub fn breathing_interval(&self) -> Duration {
        Duration::from_millis(self.breathing.interval_ms)
    }

    /// The completion tone, or `None` when the chime is disabled.
    pub fn chime_tone(&self) -> Option<ChimeTone> {
        self.chime.enabled.then(|| ChimeTone {
            frequency_hz: self.chime.frequency_hz as f32,
            peak_gain: self.chime.peak_gain as f32,
            attack: Duration::from_millis(self.chime.attack_ms),
            decay: Duration::from_millis(self.chime.decay_ms),
        })
    }
}
