use std::fmt;

use crate::texture::{TextureHandle, FIRST_FRAMEBUFFER_SLOT, MAX_TEXTURE_SLOTS};

use super::{Canvas, TextureOptions};

/// Largest edge accepted for an off-screen target.
pub const MAX_FRAMEBUFFER_DIMENSION: u32 = 8192;

/// Number of framebuffers that can exist at once (one sampler slot each).
pub const MAX_FRAMEBUFFERS: u32 = MAX_TEXTURE_SLOTS - FIRST_FRAMEBUFFER_SLOT;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FramebufferId(pub(crate) u32);

impl fmt::Display for FramebufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fb{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferError {
    InvalidSize { width: u32, height: u32 },
    NoFreeSlot,
    Unknown(FramebufferId),
}

impl fmt::Display for FramebufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramebufferError::InvalidSize { width, height } => write!(
                f,
                "invalid framebuffer size {width}x{height} (each edge must be 1..={MAX_FRAMEBUFFER_DIMENSION})"
            ),
            FramebufferError::NoFreeSlot => {
                write!(f, "all {MAX_FRAMEBUFFERS} framebuffer slots are in use")
            }
            FramebufferError::Unknown(id) => write!(f, "framebuffer {id} does not exist"),
        }
    }
}

impl std::error::Error for FramebufferError {}

pub(crate) fn validate_size(width: u32, height: u32) -> Result<(), FramebufferError> {
    let ok = |v: u32| (1..=MAX_FRAMEBUFFER_DIMENSION).contains(&v);
    if ok(width) && ok(height) {
        Ok(())
    } else {
        Err(FramebufferError::InvalidSize { width, height })
    }
}

/// Off-screen render target created by [`Canvas::add_framebuffer`].
///
/// The handle is owned by its creator and released with
/// [`Framebuffer::destroy`]. Its pending geometry and clear state live in the
/// canvas; the GPU attachments live in the renderer, which drops them on the
/// next draw after the framebuffer is destroyed.
#[derive(Debug)]
pub struct Framebuffer {
    pub(crate) id: FramebufferId,
    pub(crate) slot: u32,
    pub(crate) texture: TextureHandle,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Framebuffer {
    #[inline]
    pub fn id(&self) -> FramebufferId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sampler slot the framebuffer's color texture is bound to.
    #[inline]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Handle usable with [`Canvas::render_texture`].
    #[inline]
    pub fn texture_handle(&self) -> TextureHandle {
        self.texture
    }

    /// Changes the target size. Existing content is discarded.
    pub fn resize(&mut self, canvas: &mut Canvas, width: u32, height: u32) -> Result<(), FramebufferError> {
        canvas.resize_framebuffer(self.id, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Draws the framebuffer's content into the parent target at the given
    /// pixel rectangle.
    ///
    /// If this framebuffer is the bound target it is unbound first, so the
    /// usual sequence is bind, draw shapes, `draw`.
    pub fn draw(&self, canvas: &mut Canvas, x: f32, y: f32, width: f32, height: f32) {
        if canvas.bound_framebuffer() == Some(self.id) {
            canvas.unbind_framebuffer();
        }
        canvas.render_framebuffer(self, &TextureOptions::at(x, y).sized(width, height));
    }

    /// Releases the framebuffer's slot and texture handle.
    pub fn destroy(self, canvas: &mut Canvas) {
        canvas.remove_framebuffer(self.id);
    }
}
