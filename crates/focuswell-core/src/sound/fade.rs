//! Stepwise fade-out.
//!
//! Every in-flight fade is identified by a [`FadeToken`]. A track holds at
//! most one token; issuing a new one for the same track cancels the old
//! fade, so repeated fade requests never stack up.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FadeToken(u64);

impl FadeToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FadeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fade#{}", self.0)
    }
}

/// Hands out fresh tokens, never reusing one.
#[derive(Debug, Clone, Default)]
pub struct FadeTokens {
    next: u64,
}

impl FadeTokens {
    pub fn issue(&mut self) -> FadeToken {
        self.next += 1;
        FadeToken(self.next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeStep {
    /// Keep fading at this volume.
    Lowered(f32),
    /// Close enough to silence: stop the track.
    Finished,
}

/// Lower `volume` by `step`, or finish once it is no louder than `step`.
pub fn step_volume(volume: f32, step: f32) -> FadeStep {
    if volume > step {
        FadeStep::Lowered(volume - step)
    } else {
        FadeStep::Finished
    }
}
