//! Plantain: a small 2D game engine.
//!
//! Games implement [`core::Game`] and hand it to [`window::Engine::run`].
//! Drawing goes through [`render::Canvas`], which batches shapes, text,
//! textures and framebuffers into as few render passes as the frame allows.

pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod shapes;
pub mod text;
pub mod texture;
pub mod time;
pub mod window;

pub use crate::core::{EngineConfig, FrameCtx, Game, UpdateCtx, WindowCtx, WindowMode};
pub use crate::window::Engine;
