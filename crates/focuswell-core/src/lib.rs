//! # Focuswell Core Library
//!
//! This library holds all of the behaviour of a Focuswell focus session:
//! a countdown with duration presets, a breathing cue, looping ambient
//! sound with fade-out, a completion chime and a persisted light/dark
//! theme. It is host-agnostic; the `focuswell` CLI is one host.
//!
//! ## Architecture
//!
//! - **Session Controller**: owns all session state and is driven by user
//!   input plus three host-scheduled callbacks (countdown tick, breathing
//!   flip, fade step). No internal threads or clocks.
//! - **Sound**: audio output sits behind the [`AudioSink`] and
//!   [`ChimeOutput`] traits so hosts can plug in a real backend.
//! - **Storage**: SQLite key-value preference storage and TOML
//!   configuration.
//!
//! ## Key Components
//!
//! - [`SessionController`]: the single entry point for hosts
//! - [`CountdownTimer`]: Idle/Running countdown state machine
//! - [`AmbientPlayer`]: one-at-a-time looping playback with fade tokens
//! - [`ThemeManager`]: light/dark preference
//! - [`Config`]: application configuration management

pub mod breathing;
pub mod error;
pub mod events;
pub mod session;
pub mod sound;
pub mod storage;
pub mod theme;
pub mod timer;

pub use breathing::{BreathPhase, BreathingCue};
pub use error::{AudioError, ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use session::{SessionController, SessionInput, SessionView};
pub use sound::{AmbientPlayer, AmbientTrack, AudioSink, ChimeOutput, ChimeTone, FadeToken};
pub use storage::{Config, Database, MemoryStore, PreferenceStore};
pub use theme::{FixedAppearance, SystemAppearance, ThemeManager, ThemePreference};
pub use timer::{format_time, CountdownTimer, Presets, Selection, TimerState};
