//! Countdown timer state machine.
//!
//! The timer owns no thread and no clock. The host schedules a repeating
//! one-second callback while the timer is running and forwards each one
//! to [`CountdownTimer::tick`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle --toggle--> Running --toggle--> Idle
//! Running --tick at 0:00--> (Completed) --> Idle
//! ```
//!
//! Completion is transient: the tick that finds zero seconds left stops
//! the timer and reports [`Event::TimerCompleted`] exactly once.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::{format_time, parse_custom_minutes};
use super::presets::{Presets, Selection, DEFAULT_MINUTES};
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

impl TimerState {
    /// Label for the start/pause control.
    pub fn button_label(&self) -> &'static str {
        match self {
            TimerState::Idle => "Start",
            TimerState::Running => "Pause",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTimer {
    presets: Presets,
    default_minutes: u32,
    state: TimerState,
    selection: Selection,
    remaining_secs: u64,
}

impl CountdownTimer {
    /// Create an idle timer set to `default_minutes`.
    ///
    /// If the default duration is one of the presets, that preset starts
    /// out active.
    pub fn new(presets: Presets, default_minutes: u32) -> Self {
        let default_minutes = if default_minutes == 0 {
            DEFAULT_MINUTES
        } else {
            default_minutes
        };
        let selection = if presets.contains(default_minutes) {
            Selection::Preset(default_minutes)
        } else {
            Selection::None
        };
        Self {
            presets,
            default_minutes,
            state: TimerState::Idle,
            selection,
            remaining_secs: minutes_to_secs(default_minutes),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    pub fn display(&self) -> String {
        format_time(self.remaining_secs)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch to a preset duration, stopping the countdown if it runs.
    ///
    /// # Errors
    /// Returns an error if `minutes` is not one of the configured presets.
    pub fn select_preset(&mut self, minutes: u32) -> Result<Event, ValidationError> {
        if !self.presets.contains(minutes) {
            return Err(ValidationError::UnknownPreset { minutes });
        }
        Ok(self.apply_duration(Selection::Preset(minutes), minutes))
    }

    /// Apply a typed custom duration.
    ///
    /// Returns `None` and leaves the timer untouched when the input is
    /// not a positive number.
    pub fn set_custom(&mut self, input: &str) -> Option<Event> {
        let minutes = parse_custom_minutes(input)?;
        Some(self.apply_duration(Selection::Custom(minutes), minutes))
    }

    /// Start when idle, pause when running.
    pub fn toggle(&mut self) -> Event {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running;
                Event::TimerStarted {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                }
            }
            TimerState::Running => {
                self.state = TimerState::Idle;
                Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                }
            }
        }
    }

    /// One-second callback. Ignored while idle.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            debug!(remaining = self.remaining_secs, "countdown tick");
            return Some(Event::TimerTicked {
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            });
        }
        self.state = TimerState::Idle;
        Some(Event::TimerCompleted { at: Utc::now() })
    }

    /// Stop and restore the active preset's duration.
    ///
    /// Falls back to the default duration when no preset is active,
    /// including when a custom value is in use.
    pub fn reset(&mut self) -> Event {
        self.state = TimerState::Idle;
        let minutes = self
            .selection
            .active_preset()
            .unwrap_or(self.default_minutes);
        self.remaining_secs = minutes_to_secs(minutes);
        Event::TimerReset {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Enter pressed in the custom input: starts the timer when the input
    /// holds a positive value and the timer is idle.
    pub fn submit_custom_on_enter(&mut self, input: &str) -> Option<Event> {
        if self.state == TimerState::Running || parse_custom_minutes(input).is_none() {
            return None;
        }
        Some(self.toggle())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_duration(&mut self, selection: Selection, minutes: u32) -> Event {
        self.state = TimerState::Idle;
        self.selection = selection;
        self.remaining_secs = minutes_to_secs(minutes);
        Event::DurationSelected {
            selection,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(Presets::default(), DEFAULT_MINUTES)
    }
}

fn minutes_to_secs(minutes: u32) -> u64 {
    u64::from(minutes).saturating_mul(60)
}
