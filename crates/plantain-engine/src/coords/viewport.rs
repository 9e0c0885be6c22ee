use super::ndc::to_ndc;
use super::Vec2;

/// Size of the render target currently being drawn into, in pixels.
///
/// Shapes use this as the basis for the pixel → NDC conversion. It changes
/// when the window is resized and while a framebuffer is bound.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Value written into `Vertex::resolution`.
    #[inline]
    pub fn resolution(self) -> [f32; 2] {
        [self.width, self.height]
    }

    #[inline]
    pub fn to_ndc(self, p: Vec2) -> [f32; 2] {
        to_ndc(p.x, p.y, self.width, self.height)
    }
}
