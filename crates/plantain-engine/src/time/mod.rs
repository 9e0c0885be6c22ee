//! Loop timing.
//!
//! - [`FrameClock`]: clamped per-iteration deltas
//! - [`FixedStep`]: turns deltas into a whole number of simulation ticks
//! - [`FpsCounter`]: presented frames per second

mod fixed_step;
mod fps;
mod frame_clock;

pub use fixed_step::{FixedStep, DEFAULT_TICK_RATE};
pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime, MAX_FRAME_DELTA};
