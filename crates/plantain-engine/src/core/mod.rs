//! Contracts between the engine loop and game code.
//!
//! A game implements [`Game`]; the loop hands it an [`UpdateCtx`] per fixed
//! step and a [`FrameCtx`] per rendered frame.

mod config;
mod ctx;
mod game;

pub use config::EngineConfig;
pub use ctx::{FrameCtx, UpdateCtx, WindowCtx, WindowMode};
pub use game::Game;
