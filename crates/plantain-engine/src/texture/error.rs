use std::fmt;

use super::TextureHandle;

/// Errors produced by texture uploads and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// Image has zero width or height.
    EmptyImage,
    /// Growing the atlas to `requested` would exceed the maximum dimension.
    AtlasFull { requested: u32, max: u32 },
    /// Handle space for atlas textures is used up.
    HandlesExhausted,
    /// Handle was never issued by this manager (or names a framebuffer).
    UnknownHandle(TextureHandle),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::EmptyImage => write!(f, "image has zero size"),
            TextureError::AtlasFull { requested, max } => {
                write!(f, "texture atlas cannot grow to {requested} (max {max})")
            }
            TextureError::HandlesExhausted => write!(f, "no texture handles left"),
            TextureError::UnknownHandle(h) => write!(f, "unknown texture handle {h}"),
        }
    }
}

impl std::error::Error for TextureError {}
