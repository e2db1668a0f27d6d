use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::breathing::BreathPhase;
use crate::sound::{AmbientTrack, FadeToken};
use crate::theme::ThemePreference;
use crate::timer::Selection;

/// Every state change in a session produces an Event.
/// Hosts render from the view and may log or stream the events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ThemeChanged {
        theme: ThemePreference,
        at: DateTime<Utc>,
    },
    DurationSelected {
        selection: Selection,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerTicked {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero and stopped itself.
    TimerCompleted {
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ChimePlayed {
        at: DateTime<Utc>,
    },
    ChimeFailed {
        message: String,
        at: DateTime<Utc>,
    },
    SoundStarted {
        track: AmbientTrack,
        at: DateTime<Utc>,
    },
    SoundStopped {
        track: AmbientTrack,
        at: DateTime<Utc>,
    },
    /// The backend refused to start the track; nothing is marked playing.
    SoundFailed {
        track: AmbientTrack,
        message: String,
        at: DateTime<Utc>,
    },
    FadeStarted {
        track: AmbientTrack,
        token: FadeToken,
        at: DateTime<Utc>,
    },
    FadeCancelled {
        track: AmbientTrack,
        token: FadeToken,
        at: DateTime<Utc>,
    },
    FadeFinished {
        track: AmbientTrack,
        token: FadeToken,
        at: DateTime<Utc>,
    },
    VolumeChanged {
        volume: f32,
        at: DateTime<Utc>,
    },
    BreathingChanged {
        phase: BreathPhase,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::SoundStarted {
            track: AmbientTrack::Rain,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SoundStarted");
        assert_eq!(json["track"], "rain");
    }
}
