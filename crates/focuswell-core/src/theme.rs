//! Light/dark theme with a persisted preference.
//!
//! The preference lives under a single key holding `"dark"` or `"light"`.
//! It is read once at startup and written back on every toggle.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::ValidationError;
use crate::events::Event;
use crate::storage::PreferenceStore;

/// Storage key for the theme preference.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Glyph shown on the toggle: the sun offers a way out of dark mode,
    /// the moon a way into it.
    pub fn icon(&self) -> &'static str {
        match self {
            ThemePreference::Dark => "☀️",
            ThemePreference::Light => "🌙",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            other => Err(ValidationError::UnknownTheme(other.to_string())),
        }
    }
}

/// Source of the host's dark-mode preference.
pub trait SystemAppearance {
    fn prefers_dark(&self) -> bool;
}

/// Fixed answer, for hosts that know the preference up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAppearance(pub bool);

impl SystemAppearance for FixedAppearance {
    fn prefers_dark(&self) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeManager {
    current: ThemePreference,
}

impl ThemeManager {
    /// Resolve the startup theme.
    ///
    /// A stored value wins; anything stored other than `"dark"` means
    /// light. The system preference is only consulted when nothing is
    /// stored. A failing store is treated as empty.
    pub fn initialize(store: &dyn PreferenceStore, system: &dyn SystemAppearance) -> Self {
        let saved = store.get(THEME_KEY).unwrap_or_else(|e| {
            warn!("failed to read theme preference: {e}");
            None
        });
        let current = match saved.as_deref() {
            Some("dark") => ThemePreference::Dark,
            Some(_) => ThemePreference::Light,
            None if system.prefers_dark() => ThemePreference::Dark,
            None => ThemePreference::Light,
        };
        Self { current }
    }

    pub fn current(&self) -> ThemePreference {
        self.current
    }

    pub fn icon(&self) -> &'static str {
        self.current.icon()
    }

    /// Flip the theme and persist it. A failed write is logged and the
    /// in-memory theme still flips.
    pub fn toggle(&mut self, store: &mut dyn PreferenceStore) -> Event {
        self.set(self.current.flipped(), store)
    }

    /// Apply and persist an explicit theme.
    pub fn set(&mut self, theme: ThemePreference, store: &mut dyn PreferenceStore) -> Event {
        self.current = theme;
        if let Err(e) = store.set(THEME_KEY, theme.as_str()) {
            warn!("failed to persist theme preference: {e}");
        }
        Event::ThemeChanged {
            theme,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Locked)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }
    }

    #[test]
    fn stored_value_wins_over_system() {
        let mut store = MemoryStore::default();
        store.set(THEME_KEY, "light").unwrap();
        let theme = ThemeManager::initialize(&store, &FixedAppearance(true));
        assert_eq!(theme.current(), ThemePreference::Light);
        assert_eq!(theme.icon(), "🌙");
    }

    #[test]
    fn falls_back_to_system_then_light() {
        let store = MemoryStore::default();
        let dark = ThemeManager::initialize(&store, &FixedAppearance(true));
        assert_eq!(dark.current(), ThemePreference::Dark);
        assert_eq!(dark.icon(), "☀️");

        let light = ThemeManager::initialize(&store, &FixedAppearance(false));
        assert_eq!(light.current(), ThemePreference::Light);
    }

    #[test]
    fn unrecognised_stored_value_means_light() {
        let mut store = MemoryStore::default();
        store.set(THEME_KEY, "solarized").unwrap();
        let theme = ThemeManager::initialize(&store, &FixedAppearance(true));
        assert_eq!(theme.current(), ThemePreference::Light);
    }

    #[test]
    fn toggling_twice_restores_mode_and_stored_value() {
        let mut store = MemoryStore::default();
        store.set(THEME_KEY, "dark").unwrap();
        let mut theme = ThemeManager::initialize(&store, &FixedAppearance(false));

        theme.toggle(&mut store);
        assert_eq!(theme.current(), ThemePreference::Light);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));

        theme.toggle(&mut store);
        assert_eq!(theme.current(), ThemePreference::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn broken_store_degrades_to_defaults() {
        let mut store = BrokenStore;
        let mut theme = ThemeManager::initialize(&store, &FixedAppearance(false));
        assert_eq!(theme.current(), ThemePreference::Light);
        theme.toggle(&mut store);
        assert_eq!(theme.current(), ThemePreference::Dark);
    }

    #[test]
    fn parses_theme_names() {
        assert_eq!("Dark".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert!("blue".parse::<ThemePreference>().is_err());
    }
}
