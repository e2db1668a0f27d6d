//! Decorative breathing cue: a label that flips between Inhale and Exhale
//! on a fixed interval for as long as the session lives.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::events::Event;

pub const DEFAULT_BREATH_INTERVAL_MS: u64 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    Inhale,
    Exhale,
}

impl BreathPhase {
    pub fn label(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Inhale",
            BreathPhase::Exhale => "Exhale",
        }
    }
}

impl fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingCue {
    phase: BreathPhase,
}

impl BreathingCue {
    pub fn new() -> Self {
        Self {
            phase: BreathPhase::Inhale,
        }
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    /// Interval callback.
    pub fn flip(&mut self) -> Event {
        self.phase = match self.phase {
            BreathPhase::Inhale => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::Inhale,
        };
        Event::BreathingChanged {
            phase: self.phase,
            at: Utc::now(),
        }
    }
}

impl Default for BreathingCue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inhaling_and_alternates() {
        let mut cue = BreathingCue::new();
        assert_eq!(cue.phase().label(), "Inhale");
        cue.flip();
        assert_eq!(cue.phase().label(), "Exhale");
        cue.flip();
        assert_eq!(cue.phase(), BreathPhase::Inhale);
    }
}
