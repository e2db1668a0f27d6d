//! Ambient sound player.
//!
//! At most one track is current ("playing") at a time. Starting another
//! track stops the current one and rewinds it; starting the current track
//! again stops it. When the countdown completes the current track is
//! faded out step by step rather than cut.
//!
//! Fades are tracked per track with a [`FadeToken`]. Two rules keep fades
//! and playback from fighting over the same sink:
//!
//! - a new fade of a track replaces (cancels) the previous one;
//! - playing a track cancels its in-flight fade before starting it.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::fade::{step_volume, FadeStep, FadeToken, FadeTokens};
use super::sink::AudioSink;
use super::track::AmbientTrack;
use crate::events::Event;

pub const DEFAULT_VOLUME: f32 = 0.5;
pub const DEFAULT_FADE_STEP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSettings {
    /// Volume for new playback and the level restored after a fade.
    pub volume: f32,
    /// Volume removed per fade step.
    pub fade_step: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            fade_step: DEFAULT_FADE_STEP,
        }
    }
}

struct TrackSlot<S> {
    sink: S,
    fade: Option<FadeToken>,
}

pub struct AmbientPlayer<S: AudioSink> {
    /// Indexed by [`AmbientTrack::index`].
    slots: [TrackSlot<S>; 3],
    current: Option<AmbientTrack>,
    settings: PlayerSettings,
    tokens: FadeTokens,
}

impl<S: AudioSink> AmbientPlayer<S> {
    /// Build one sink per track. Sinks are created once and kept for the
    /// lifetime of the player.
    pub fn new(settings: PlayerSettings, mut open: impl FnMut(AmbientTrack) -> S) -> Self {
        let settings = PlayerSettings {
            volume: settings.volume.clamp(0.0, 1.0),
            ..settings
        };
        let slots = AmbientTrack::ALL.map(|track| {
            let mut sink = open(track);
            sink.set_volume(settings.volume);
            TrackSlot { sink, fade: None }
        });
        Self {
            slots,
            current: None,
            settings,
            tokens: FadeTokens::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The track marked as playing, if any.
    pub fn playing(&self) -> Option<AmbientTrack> {
        self.current
    }

    pub fn volume(&self) -> f32 {
        self.settings.volume
    }

    pub fn is_fading(&self) -> bool {
        self.slots.iter().any(|slot| slot.fade.is_some())
    }

    pub fn fade_token(&self, track: AmbientTrack) -> Option<FadeToken> {
        self.slot(track).fade
    }

    pub fn sink(&self, track: AmbientTrack) -> &S {
        &self.slot(track).sink
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Select a track: stops it if it is current, otherwise switches to it.
    ///
    /// If the sink refuses to start, the failure is logged and no track
    /// is left marked as playing.
    pub fn play(&mut self, track: AmbientTrack) -> Vec<Event> {
        let mut events = Vec::new();

        if self.current == Some(track) {
            self.current = None;
            self.stop_slot(track);
            events.push(Event::SoundStopped {
                track,
                at: Utc::now(),
            });
            return events;
        }

        if let Some(previous) = self.current.take() {
            self.stop_slot(previous);
            events.push(Event::SoundStopped {
                track: previous,
                at: Utc::now(),
            });
        }

        let volume = self.settings.volume;
        let slot = self.slot_mut(track);
        if let Some(token) = slot.fade.take() {
            // The fade would have ended at the start of the track anyway.
            slot.sink.rewind();
            events.push(Event::FadeCancelled {
                track,
                token,
                at: Utc::now(),
            });
        }
        slot.sink.set_volume(volume);

        match slot.sink.play() {
            Ok(()) => {
                info!(%track, "ambient track started");
                self.current = Some(track);
                events.push(Event::SoundStarted {
                    track,
                    at: Utc::now(),
                });
            }
            Err(e) => {
                warn!(%track, "audio play failed: {e}");
                slot.sink.pause();
                slot.sink.rewind();
                events.push(Event::SoundFailed {
                    track,
                    message: e.to_string(),
                    at: Utc::now(),
                });
            }
        }
        events
    }

    /// Release the current track and start fading it out.
    ///
    /// The playing marker is cleared immediately; the sink keeps sounding
    /// at decreasing volume until [`AmbientPlayer::fade_step`] finishes it.
    pub fn fade_out(&mut self) -> Vec<Event> {
        match self.current.take() {
            Some(track) => self.begin_fade(track),
            None => Vec::new(),
        }
    }

    /// Advance every in-flight fade by one step.
    pub fn fade_step(&mut self) -> Vec<Event> {
        let PlayerSettings { volume, fade_step } = self.settings;
        let mut events = Vec::new();

        for (track, slot) in AmbientTrack::ALL.into_iter().zip(self.slots.iter_mut()) {
            let Some(token) = slot.fade else { continue };
            match step_volume(slot.sink.volume(), fade_step) {
                FadeStep::Lowered(v) => {
                    slot.sink.set_volume(v);
                    debug!(%track, %token, volume = v, "fade step");
                }
                FadeStep::Finished => {
                    slot.sink.set_volume(0.0);
                    slot.sink.pause();
                    slot.sink.rewind();
                    slot.sink.set_volume(volume);
                    slot.fade = None;
                    debug!(%track, %token, "fade finished");
                    events.push(Event::FadeFinished {
                        track,
                        token,
                        at: Utc::now(),
                    });
                }
            }
        }
        events
    }

    /// Change the playback volume, clamped to `[0, 1]`.
    ///
    /// Applies to the current track right away and to every later play
    /// and post-fade restore. Fading tracks keep fading.
    pub fn set_volume(&mut self, volume: f32) -> Event {
        let volume = if volume.is_nan() { self.settings.volume } else { volume.clamp(0.0, 1.0) };
        self.settings.volume = volume;
        if let Some(track) = self.current {
            self.slot_mut(track).sink.set_volume(volume);
        }
        Event::VolumeChanged {
            volume,
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin_fade(&mut self, track: AmbientTrack) -> Vec<Event> {
        let mut events = Vec::new();
        let token = self.tokens.issue();
        let slot = self.slot_mut(track);
        if let Some(previous) = slot.fade.replace(token) {
            events.push(Event::FadeCancelled {
                track,
                token: previous,
                at: Utc::now(),
            });
        }
        info!(%track, %token, "fading out ambient track");
        events.push(Event::FadeStarted {
            track,
            token,
            at: Utc::now(),
        });
        events
    }

    fn stop_slot(&mut self, track: AmbientTrack) {
        let volume = self.settings.volume;
        let slot = self.slot_mut(track);
        slot.fade = None;
        slot.sink.pause();
        slot.sink.rewind();
        slot.sink.set_volume(volume);
    }

    fn slot(&self, track: AmbientTrack) -> &TrackSlot<S> {
        &self.slots[track.index()]
    }

    fn slot_mut(&mut self, track: AmbientTrack) -> &mut TrackSlot<S> {
        &mut self.slots[track.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;

    #[derive(Debug, Default)]
    struct FakeSink {
        playing: bool,
        position_ms: u64,
        volume: f32,
        fail: bool,
    }

    impl AudioSink for FakeSink {
        fn play(&mut self) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::PlaybackRejected("interaction required".into()));
            }
            self.playing = true;
            self.position_ms += 1_000;
            Ok(())
        }
        fn pause(&mut self) {
            self.playing = false;
        }
        fn rewind(&mut self) {
            self.position_ms = 0;
        }
        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }
        fn volume(&self) -> f32 {
            self.volume
        }
    }

    fn player() -> AmbientPlayer<FakeSink> {
        AmbientPlayer::new(PlayerSettings::default(), |_| FakeSink::default())
    }

    fn finish_fades(player: &mut AmbientPlayer<FakeSink>) -> usize {
        let mut finished = 0;
        for _ in 0..100 {
            finished += player.fade_step().len();
            if !player.is_fading() {
                break;
            }
        }
        finished
    }

    #[test]
    fn each_track_owns_its_sink() {
        for track in AmbientTrack::ALL {
            let mut p = player();
            p.play(track);
            for other in AmbientTrack::ALL {
                assert_eq!(p.sink(other).playing, other == track, "{other} after playing {track}");
            }
        }
    }

    #[test]
    fn switching_tracks_stops_and_rewinds_previous() {
        let mut p = player();
        p.play(AmbientTrack::Waves);
        p.play(AmbientTrack::Rain);
        assert_eq!(p.playing(), Some(AmbientTrack::Rain));
        assert!(p.sink(AmbientTrack::Rain).playing);
        assert!(!p.sink(AmbientTrack::Waves).playing);
        assert_eq!(p.sink(AmbientTrack::Waves).position_ms, 0);
    }

    #[test]
    fn playing_current_track_again_stops_it() {
        let mut p = player();
        p.play(AmbientTrack::Rain);
        let events = p.play(AmbientTrack::Rain);
        assert!(matches!(events[..], [Event::SoundStopped { track: AmbientTrack::Rain, .. }]));
        assert_eq!(p.playing(), None);
        let rain = p.sink(AmbientTrack::Rain);
        assert!(!rain.playing);
        assert_eq!(rain.position_ms, 0);
        assert_eq!(rain.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn failed_start_leaves_nothing_playing() {
        let mut p = AmbientPlayer::new(PlayerSettings::default(), |track| FakeSink {
            fail: track == AmbientTrack::Forest,
            ..FakeSink::default()
        });
        p.play(AmbientTrack::Rain);
        let events = p.play(AmbientTrack::Forest);
        assert!(events.iter().any(|e| matches!(e, Event::SoundFailed { .. })));
        assert_eq!(p.playing(), None);
        assert!(!p.sink(AmbientTrack::Rain).playing);
    }

    #[test]
    fn fade_out_clears_marker_then_stops_at_default_volume() {
        let mut p = player();
        p.play(AmbientTrack::Forest);
        let events = p.fade_out();
        assert!(matches!(events[..], [Event::FadeStarted { .. }]));
        assert_eq!(p.playing(), None);
        assert!(p.sink(AmbientTrack::Forest).playing);

        assert_eq!(finish_fades(&mut p), 1);
        let forest = p.sink(AmbientTrack::Forest);
        assert!(!forest.playing);
        assert_eq!(forest.position_ms, 0);
        assert_eq!(forest.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn fade_out_without_current_track_does_nothing() {
        let mut p = player();
        assert!(p.fade_out().is_empty());
        assert!(!p.is_fading());
    }

    #[test]
    fn new_fade_of_same_track_cancels_previous() {
        let mut p = player();
        p.play(AmbientTrack::Rain);
        p.fade_out();
        let first = p.fade_token(AmbientTrack::Rain).unwrap();
        let events = p.begin_fade(AmbientTrack::Rain);
        let second = p.fade_token(AmbientTrack::Rain).unwrap();
        assert_ne!(first, second);
        assert!(matches!(events[0], Event::FadeCancelled { token, .. } if token == first));
        assert_eq!(finish_fades(&mut p), 1);
    }

    #[test]
    fn playing_a_fading_track_cancels_its_fade() {
        let mut p = player();
        p.play(AmbientTrack::Waves);
        p.fade_out();
        p.fade_step();
        p.fade_step();

        let events = p.play(AmbientTrack::Waves);
        assert!(matches!(events[0], Event::FadeCancelled { .. }));
        assert!(!p.is_fading());
        assert_eq!(p.playing(), Some(AmbientTrack::Waves));
        let waves = p.sink(AmbientTrack::Waves);
        assert!(waves.playing);
        assert_eq!(waves.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn fade_continues_while_another_track_plays() {
        let mut p = player();
        p.play(AmbientTrack::Rain);
        p.fade_out();
        p.play(AmbientTrack::Forest);
        assert!(p.is_fading());
        finish_fades(&mut p);
        assert!(!p.sink(AmbientTrack::Rain).playing);
        assert!(p.sink(AmbientTrack::Forest).playing);
        assert_eq!(p.playing(), Some(AmbientTrack::Forest));
    }

    #[test]
    fn volume_is_clamped_and_applied_to_current() {
        let mut p = player();
        p.play(AmbientTrack::Rain);
        p.set_volume(1.7);
        assert_eq!(p.volume(), 1.0);
        assert_eq!(p.sink(AmbientTrack::Rain).volume, 1.0);
        p.set_volume(0.2);
        p.play(AmbientTrack::Waves);
        assert_eq!(p.sink(AmbientTrack::Waves).volume, 0.2);
    }
}
