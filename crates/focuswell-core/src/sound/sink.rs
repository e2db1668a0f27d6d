use crate::error::AudioError;

/// Playback handle for one looping ambient track.
///
/// Each track owns its own sink, so position and volume are independent
/// per track.
pub trait AudioSink {
    /// Start or resume looping playback from the current position.
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    /// Move the playback position back to the start.
    fn rewind(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
}

/// Sink that accepts every call and produces no sound.
#[derive(Debug, Clone, Default)]
pub struct SilentSink {
    volume: f32,
}

impl AudioSink for SilentSink {
    fn play(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn rewind(&mut self) {}

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}
