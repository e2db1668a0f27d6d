//! Session controller.
//!
//! Owns every piece of session state (theme, countdown, breathing cue,
//! ambient player, custom input field) and is the only thing a host talks
//! to. The host forwards user input through [`SessionController::handle`]
//! and drives three repeating callbacks:
//!
//! | callback                          | period            | when            |
//! |-----------------------------------|-------------------|-----------------|
//! | [`SessionController::tick_second`] | 1 s               | while running   |
//! | [`SessionController::breathe`]     | breathing interval | always          |
//! | [`SessionController::fade_step`]   | fade interval     | while fading    |
//!
//! Each call runs to completion, so no locking is involved.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::breathing::{BreathPhase, BreathingCue};
use crate::error::ValidationError;
use crate::events::Event;
use crate::sound::{AmbientPlayer, AmbientTrack, AudioSink, ChimeOutput, ChimeTone};
use crate::storage::{Config, PreferenceStore};
use crate::theme::{SystemAppearance, ThemeManager, ThemePreference};
use crate::timer::{CountdownTimer, TimerState};

/// User input, one variant per control on the visual surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    ToggleTheme,
    /// The start/pause button.
    StartPause,
    Reset,
    SelectPreset(u32),
    /// New contents of the custom duration field.
    CustomInput(String),
    /// Enter pressed in the custom duration field.
    CustomEnter,
    SelectSound(AmbientTrack),
    SetVolume(f32),
}

/// Snapshot of everything a host needs to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub theme: ThemePreference,
    pub theme_icon: String,
    pub time_display: String,
    pub remaining_secs: u64,
    pub timer_state: TimerState,
    pub start_label: String,
    pub active_preset: Option<u32>,
    pub presets: Vec<u32>,
    pub custom_input: String,
    pub custom_focused: bool,
    pub breathing: BreathPhase,
    pub playing: Option<AmbientTrack>,
    pub volume: f32,
}

pub struct SessionController<S: AudioSink> {
    theme: ThemeManager,
    store: Box<dyn PreferenceStore>,
    timer: CountdownTimer,
    breathing: BreathingCue,
    player: AmbientPlayer<S>,
    chime: Box<dyn ChimeOutput>,
    chime_tone: Option<ChimeTone>,
    custom_input: String,
    custom_focused: bool,
}

impl<S: AudioSink> SessionController<S> {
    /// Initialize a session: resolve the theme, build the countdown at
    /// its default duration, create one sink per ambient track and start
    /// the breathing cue on "Inhale".
    pub fn new(
        config: &Config,
        store: Box<dyn PreferenceStore>,
        system: &dyn SystemAppearance,
        chime: Box<dyn ChimeOutput>,
        open_sink: impl FnMut(AmbientTrack) -> S,
    ) -> Self {
        let theme = ThemeManager::initialize(store.as_ref(), system);
        let timer = CountdownTimer::new(config.presets(), config.timer.default_minutes);
        let player = AmbientPlayer::new(config.player_settings(), open_sink);
        info!(theme = %theme.current(), remaining = timer.remaining_secs(), "session initialized");
        Self {
            theme,
            store,
            timer,
            breathing: BreathingCue::new(),
            player,
            chime,
            chime_tone: config.chime_tone(),
            custom_input: String::new(),
            custom_focused: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn is_fading(&self) -> bool {
        self.player.is_fading()
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn player(&self) -> &AmbientPlayer<S> {
        &self.player
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme.current()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            theme: self.theme.current(),
            theme_icon: self.theme.icon().to_string(),
            time_display: self.timer.display(),
            remaining_secs: self.timer.remaining_secs(),
            timer_state: self.timer.state(),
            start_label: self.timer.state().button_label().to_string(),
            active_preset: self.timer.selection().active_preset(),
            presets: self.timer.presets().minutes().to_vec(),
            custom_input: self.custom_input.clone(),
            custom_focused: self.custom_focused,
            breathing: self.breathing.phase(),
            playing: self.player.playing(),
            volume: self.player.volume(),
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Apply one user input.
    ///
    /// # Errors
    /// Returns an error only for a preset that is not configured; every
    /// other invalid input is ignored without error.
    pub fn handle(&mut self, input: SessionInput) -> Result<Vec<Event>, ValidationError> {
        let events = match input {
            SessionInput::ToggleTheme => vec![self.theme.toggle(self.store.as_mut())],
            SessionInput::StartPause => vec![self.timer.toggle()],
            SessionInput::Reset => vec![self.timer.reset()],
            SessionInput::SelectPreset(minutes) => {
                let event = self.timer.select_preset(minutes)?;
                self.custom_input.clear();
                vec![event]
            }
            SessionInput::CustomInput(text) => {
                self.custom_focused = true;
                let event = self.timer.set_custom(&text);
                self.custom_input = text;
                event.into_iter().collect()
            }
            SessionInput::CustomEnter => {
                self.custom_focused = false;
                self.timer
                    .submit_custom_on_enter(&self.custom_input)
                    .into_iter()
                    .collect()
            }
            SessionInput::SelectSound(track) => self.player.play(track),
            SessionInput::SetVolume(volume) => vec![self.player.set_volume(volume)],
        };
        Ok(events)
    }

    // ── Host callbacks ───────────────────────────────────────────────

    /// One-second countdown callback. On completion plays the chime and
    /// fades out the ambient track.
    pub fn tick_second(&mut self) -> Vec<Event> {
        let Some(event) = self.timer.tick() else {
            return Vec::new();
        };
        let completed = matches!(event, Event::TimerCompleted { .. });
        let mut events = vec![event];
        if completed {
            info!("countdown completed");
            if let Some(event) = self.play_chime() {
                events.push(event);
            }
            events.extend(self.player.fade_out());
        }
        events
    }

    /// Breathing interval callback.
    pub fn breathe(&mut self) -> Event {
        self.breathing.flip()
    }

    /// Fade interval callback.
    pub fn fade_step(&mut self) -> Vec<Event> {
        self.player.fade_step()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn play_chime(&mut self) -> Option<Event> {
        let tone = self.chime_tone?;
        let at = Utc::now();
        Some(match self.chime.play(&tone) {
            Ok(()) => Event::ChimePlayed { at },
            Err(e) => {
                warn!("chime failed: {e}");
                Event::ChimeFailed {
                    message: e.to_string(),
                    at,
                }
            }
        })
    }
}
