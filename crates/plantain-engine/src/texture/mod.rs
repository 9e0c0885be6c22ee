//! CPU-side texture storage.
//!
//! Images are `image::RgbaImage`, rows top to bottom.
//!
//! - [`TextureAtlas`]: growable power-of-two atlas with first-fit placement
//! - [`TextureManager`]: handle issuance, uploads/updates and framebuffer
//!   texture registration in one id space
//!
//! The renderer mirrors the atlas onto the GPU whenever its generation moves.

mod atlas;
mod error;
mod manager;

pub use atlas::{AtlasRect, TextureAtlas, INITIAL_ATLAS_DIMENSION, MAX_ATLAS_DIMENSION};
pub use error::TextureError;
pub use image::{Rgba, RgbaImage};
pub use manager::{RowOrder, TextureHandle, TextureManager, TextureSource, FRAMEBUFFER_HANDLE_BASE};

/// Sampler slot of the glyph atlas.
pub const GLYPH_SLOT: u32 = 0;

/// Sampler slot of the RGBA texture atlas.
pub const ATLAS_SLOT: u32 = 1;

/// First sampler slot available to framebuffers.
pub const FIRST_FRAMEBUFFER_SLOT: u32 = 2;

/// Total sampler slots addressable by the primitive shader.
pub const MAX_TEXTURE_SLOTS: u32 = 16;
