//! Terminal dark-mode detection.

use focuswell_core::{Config, SystemAppearance};

/// Reads `ui.prefers_dark` from config, then the terminal's `COLORFGBG`.
pub struct TerminalAppearance {
    configured: Option<bool>,
    colorfgbg: Option<String>,
}

impl TerminalAppearance {
    pub fn detect(config: &Config) -> Self {
        Self {
            configured: config.ui.prefers_dark,
            colorfgbg: std::env::var("COLORFGBG").ok(),
        }
    }
}

impl SystemAppearance for TerminalAppearance {
    fn prefers_dark(&self) -> bool {
        if let Some(dark) = self.configured {
            return dark;
        }
        self.colorfgbg
            .as_deref()
            .is_some_and(background_is_dark)
    }
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); ANSI background
/// colours 0-6 and 8 are dark.
fn background_is_dark(value: &str) -> bool {
    value
        .rsplit(';')
        .next()
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg <= 6 || bg == 8)
}
