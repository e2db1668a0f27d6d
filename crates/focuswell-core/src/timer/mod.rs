mod engine;
mod format;
mod presets;

pub use engine::{CountdownTimer, TimerState};
pub use format::{format_time, parse_custom_minutes};
pub use presets::{Presets, Selection, DEFAULT_MINUTES};
