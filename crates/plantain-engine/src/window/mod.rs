//! Window and game loop.
//!
//! Owns the winit event loop and window and wires them to the GPU, renderer
//! and input queue.

mod runtime;
mod translate;

pub use runtime::Engine;
