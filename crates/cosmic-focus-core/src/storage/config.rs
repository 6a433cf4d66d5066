//! TOML-based user preferences.
//!
//! Stores display-only configuration:
//! - Timer durations and the auto-start-breaks policy
//! - Sound toggles (no audio is played; consumers read the flags)
//! - Theme and appearance settings
//!
//! The timer engine never reads this state; it receives a resolved
//! [`Durations`] table at construction and nothing else.
//!
//! Configuration is stored at `~/.config/cosmic-focus/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::Durations;

/// Timer-related preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_min")]
    pub focus_min: u64,
    #[serde(default = "default_short_break_min")]
    pub short_break_min: u64,
    #[serde(default = "default_long_break_min")]
    pub long_break_min: u64,
    /// Host policy: start break countdowns as soon as the auto-switch
    /// lands. The engine itself never auto-starts.
    #[serde(default = "default_true")]
    pub auto_start_breaks: bool,
    #[serde(default = "default_session_target")]
    pub daily_session_target: u32,
}

/// Sound preferences. Display-only flags for consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_volume")]
    pub volume: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Cosmic,
    Light,
    Dark,
}

/// UI preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: Theme,
    #[serde(default = "default_true")]
    pub animations: bool,
    #[serde(default)]
    pub clock_24h: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/cosmic-focus/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

// Default functions
fn default_focus_min() -> u64 {
    25
}
fn default_short_break_min() -> u64 {
    5
}
fn default_long_break_min() -> u64 {
    15
}
fn default_session_target() -> u32 {
    4
}
fn default_volume() -> u32 {
    50
}
fn default_true() -> bool {
    true
}
fn default_theme() -> Theme {
    Theme::Cosmic
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_min: default_focus_min(),
            short_break_min: default_short_break_min(),
            long_break_min: default_long_break_min(),
            auto_start_breaks: true,
            daily_session_target: default_session_target(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Cosmic,
            animations: true,
            clock_24h: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            sound: SoundConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    fn path() -> std::io::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk. A missing file writes the defaults back.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::warn!("falling back to default config: {e}");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = json.pointer(&dot_to_pointer(key))?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the key's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let slot = json
            .pointer_mut(&dot_to_pointer(key))
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let parsed = parse_as_existing(slot, value).ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse '{value}'"),
        })?;
        *slot = parsed;

        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()
    }

    /// Resolve the duration table the engine is constructed with.
    pub fn durations(&self) -> Durations {
        Durations::from_minutes(
            self.timer.focus_min,
            self.timer.short_break_min,
            self.timer.long_break_min,
        )
    }
}

fn dot_to_pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

/// Parse `value` into the JSON type already stored at the key, so a bool
/// stays a bool and a number stays a number.
fn parse_as_existing(existing: &serde_json::Value, value: &str) -> Option<serde_json::Value> {
    match existing {
        serde_json::Value::Bool(_) => value.parse::<bool>().ok().map(serde_json::Value::Bool),
        serde_json::Value::Number(_) => {
            if let Ok(n) = value.parse::<u64>() {
                Some(serde_json::Value::Number(n.into()))
            } else {
                value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
            }
        }
        serde_json::Value::Object(_) | serde_json::Value::Array(_) => None,
        _ => Some(serde_json::Value::String(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.focus_min, 25);
        assert_eq!(parsed.sound.volume, 50);
        assert_eq!(parsed.ui.theme, Theme::Cosmic);
    }

    #[test]
    fn default_durations_match_mode_table() {
        let cfg = Config::default();
        assert_eq!(cfg.durations(), Durations::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.focus_min").as_deref(), Some("25"));
        assert_eq!(cfg.get("timer.auto_start_breaks").as_deref(), Some("true"));
        assert_eq!(cfg.get("ui.theme").as_deref(), Some("cosmic"));
        assert!(cfg.get("ui.missing_key").is_none());
    }

    #[test]
    fn parse_as_existing_respects_types() {
        use serde_json::Value;
        assert_eq!(
            parse_as_existing(&Value::Bool(true), "false"),
            Some(Value::Bool(false))
        );
        assert_eq!(
            parse_as_existing(&Value::Number(25.into()), "50"),
            Some(Value::Number(50.into()))
        );
        assert!(parse_as_existing(&Value::Bool(true), "not_a_bool").is_none());
        assert_eq!(
            parse_as_existing(&Value::String("cosmic".into()), "dark"),
            Some(Value::String("dark".into()))
        );
    }

    #[test]
    fn empty_sections_deserialize_with_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.timer.daily_session_target, 4);
        assert!(cfg.timer.auto_start_breaks);
        assert!(!cfg.ui.clock_24h);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: Config = toml::from_str("[timer]\nfocus_min = 50\n").unwrap();
        assert_eq!(cfg.timer.focus_min, 50);
        assert_eq!(cfg.timer.short_break_min, 5);
        assert_eq!(cfg.durations().focus_secs, 3000);
    }

    #[test]
    fn theme_rejects_unknown_variant() {
        let result = toml::from_str::<Config>("[ui]\ntheme = \"neon\"\n");
        assert!(result.is_err());
    }
}
