//! Coordinate types and the pixel → NDC mapping shared by shapes and the canvas.
//!
//! Canonical CPU space:
//! - Pixels of the current render target
//! - Origin top-left
//! - +X right, +Y down
//!
//! Vertex positions are converted to NDC on the CPU before upload, so the
//! shader receives clip-space coordinates directly.

mod ndc;
mod vec2;
mod viewport;

pub use ndc::{from_ndc, to_ndc};
pub use vec2::Vec2;
pub use viewport::Viewport;
