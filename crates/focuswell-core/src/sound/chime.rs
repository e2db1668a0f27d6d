//! Completion chime.
//!
//! A single sine tone with a short linear attack and a long exponential
//! decay, rendered into a mono sample buffer on demand. Output is
//! fire-and-forget: a failed chime is logged by the caller and never
//! retried.

use std::f32::consts::PI;
use std::time::Duration;

use crate::error::AudioError;

/// Level the exponential decay ramps down to.
const DECAY_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChimeTone {
    pub frequency_hz: f32,
    pub peak_gain: f32,
    /// Time to ramp linearly from silence to `peak_gain`.
    pub attack: Duration,
    /// Time from the start of the tone to the end of the decay; the tone
    /// stops here.
    pub decay: Duration,
}

impl Default for ChimeTone {
    /// C5 bell: 100 ms attack to 0.3, decaying over 3 s.
    fn default() -> Self {
        Self {
            frequency_hz: 523.25,
            peak_gain: 0.3,
            attack: Duration::from_millis(100),
            decay: Duration::from_secs(3),
        }
    }
}

impl ChimeTone {
    pub const SAMPLE_RATE: u32 = 44_100;
    /// Longest tone that will be rendered.
    pub const MAX_LENGTH: Duration = Duration::from_secs(60);

    /// Envelope gain at `t` seconds after the tone starts.
    pub fn gain_at(&self, t: f32) -> f32 {
        let attack = self.attack.as_secs_f32();
        let end = self.decay.as_secs_f32();
        if t < 0.0 || t >= end {
            return 0.0;
        }
        if t < attack {
            return self.peak_gain * t / attack;
        }
        if self.peak_gain <= DECAY_FLOOR {
            return self.peak_gain;
        }
        let progress = (t - attack) / (end - attack);
        self.peak_gain * (DECAY_FLOOR / self.peak_gain).powf(progress)
    }

    /// Render the full tone as mono samples, cut off at [`Self::MAX_LENGTH`].
    pub fn samples(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f32;
        let length = self.decay.min(Self::MAX_LENGTH);
        let count = (length.as_secs_f32() * rate) as usize;
        (0..count)
            .map(|i| {
                let t = i as f32 / rate;
                (2.0 * PI * self.frequency_hz * t).sin() * self.gain_at(t)
            })
            .collect()
    }
}

/// Somewhere to send the completion chime.
pub trait ChimeOutput {
    fn play(&mut self, tone: &ChimeTone) -> Result<(), AudioError>;
}

/// Chime output that discards the tone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentChime;

impl ChimeOutput for SilentChime {
    fn play(&mut self, _tone: &ChimeTone) -> Result<(), AudioError> {
        Ok(())
    }
}
