use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// One of the fixed ambient loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientTrack {
    Rain,
    Forest,
    Waves,
}

impl AmbientTrack {
    pub const ALL: [AmbientTrack; 3] = [AmbientTrack::Rain, AmbientTrack::Forest, AmbientTrack::Waves];

    pub fn as_str(&self) -> &'static str {
        match self {
            AmbientTrack::Rain => "rain",
            AmbientTrack::Forest => "forest",
            AmbientTrack::Waves => "waves",
        }
    }

    /// Position in [`AmbientTrack::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// File name of the loop, resolved against the sound directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            AmbientTrack::Rain => "rain.wav",
            AmbientTrack::Forest => "forest.wav",
            AmbientTrack::Waves => "waves.mp3",
        }
    }
}

impl fmt::Display for AmbientTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmbientTrack {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AmbientTrack::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownTrack(s.trim().to_string()))
    }
}
