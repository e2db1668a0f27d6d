mod chime;
mod fade;
mod player;
mod sink;
mod track;

pub use chime::{ChimeOutput, ChimeTone, SilentChime};
pub use fade::{step_volume, FadeStep, FadeToken};
pub use player::{AmbientPlayer, PlayerSettings, DEFAULT_FADE_STEP, DEFAULT_VOLUME};
pub use sink::{AudioSink, SilentSink};
pub use track::AmbientTrack;
