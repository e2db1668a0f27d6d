use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Duration used when no preset is active.
pub const DEFAULT_MINUTES: u32 = 10;

/// Which duration source is currently marked active.
///
/// At most one preset is active at a time; a custom value clears every
/// preset marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "minutes", rename_all = "lowercase")]
pub enum Selection {
    Preset(u32),
    Custom(u32),
    None,
}

impl Selection {
    /// The active preset, if a preset (not a custom value) is selected.
    pub fn active_preset(&self) -> Option<u32> {
        match self {
            Selection::Preset(m) => Some(*m),
            Selection::Custom(_) | Selection::None => None,
        }
    }
}

/// The fixed set of selectable durations, in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presets {
    minutes: Vec<u32>,
}

impl Presets {
    /// Build a preset list. Duplicates are dropped, order is kept.
    ///
    /// # Errors
    /// Returns an error if the list is empty or contains zero.
    pub fn new(minutes: Vec<u32>) -> Result<Self, ValidationError> {
        if minutes.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "timer.presets".into(),
                message: "at least one preset is required".into(),
            });
        }
        if minutes.contains(&0) {
            return Err(ValidationError::InvalidValue {
                field: "timer.presets".into(),
                message: "presets must be at least one minute".into(),
            });
        }
        let mut unique = Vec::with_capacity(minutes.len());
        for m in minutes {
            if !unique.contains(&m) {
                unique.push(m);
            }
        }
        Ok(Self { minutes: unique })
    }

    pub fn minutes(&self) -> &[u32] {
        &self.minutes
    }

    pub fn contains(&self, minutes: u32) -> bool {
        self.minutes.contains(&minutes)
    }
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            minutes: vec![5, 10, 25, 45],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_zero() {
        assert!(Presets::new(vec![]).is_err());
        assert!(Presets::new(vec![5, 0]).is_err());
    }

    #[test]
    fn drops_duplicates_keeping_order() {
        let presets = Presets::new(vec![25, 5, 25, 10]).unwrap();
        assert_eq!(presets.minutes(), &[25, 5, 10]);
    }

    #[test]
    fn custom_selection_has_no_active_preset() {
        assert_eq!(Selection::Preset(25).active_preset(), Some(25));
        assert_eq!(Selection::Custom(25).active_preset(), None);
        assert_eq!(Selection::None.active_preset(), None);
    }
}
