//! Input subsystem.
//!
//! Platform-agnostic: the window runtime translates winit events into
//! [`InputEvent`]s, pushes them through an [`EventQueue`], and the loop
//! folds them into [`InputState`] once per iteration.

mod queue;
mod state;
mod types;

pub use queue::{EventQueue, DEFAULT_EVENT_QUEUE_CAPACITY};
pub use state::InputState;
pub use types::{InputEvent, Key, Modifiers, MouseButton};
