//! Core logic for the color-cycle demo.
//!
//! Everything that runs once per frame without touching the GPU lives here:
//! - Error types and result aliases
//! - Logging initialization
//! - Monotonic timer utilities
//! - Clear-color selection
//! - Frame pacing and frame-time statistics

mod color;
mod error;
mod logging;
mod pacing;
mod stats;
mod timer;

pub use color::ColorState;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use pacing::{FRAME_BUDGET, FramePacer};
pub use stats::{FRAME_HISTORY_CAPACITY, FrameSample, FrameTimeHistory, TimingTracker};
pub use timer::Timer;
