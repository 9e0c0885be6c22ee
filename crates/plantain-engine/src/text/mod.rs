//! Font loading and the single-channel glyph atlas.
//!
//! Fonts are rasterized once at [`REFERENCE_PX`] for the printable ASCII
//! range; text at other sizes scales the reference quads.

mod error;
mod font;
mod glyph_atlas;

pub use error::FontError;
pub use font::{Font, Glyph, FIRST_CHAR, LAST_CHAR, REFERENCE_PX};
pub use glyph_atlas::{GlyphAtlas, GLYPH_ATLAS_DIMENSION, GLYPH_PADDING, SMOOTH_MARGIN};
