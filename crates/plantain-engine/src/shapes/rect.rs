use crate::coords::{Vec2, Viewport};
use crate::paint::Color;
use crate::render::{OpCode, Vertex};

use super::sdf_quad;

/// Filled rectangle with uniformly rounded corners.
///
/// `x`/`y` is the top-left corner in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Corner radius in pixels. `0` means [`Rect::DEFAULT_CORNER_RADIUS`].
    pub radius: f32,
    pub color: Color,
}

impl Rect {
    /// Radius used when `radius` is zero; keeps edges anti-aliased.
    pub const DEFAULT_CORNER_RADIUS: f32 = 1.0;

    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: Color) -> Self {
        Self { x, y, width, height, radius: 0.0, color }
    }

    #[inline]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Corner radius actually written into the vertices.
    #[inline]
    pub fn effective_radius(&self) -> f32 {
        if self.radius == 0.0 {
            Self::DEFAULT_CORNER_RADIUS
        } else {
            self.radius.max(0.0)
        }
    }

    /// Inclusive point-in-rectangle test.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn vertices(&self, viewport: Viewport) -> Vec<Vertex> {
        if !viewport.is_valid() {
            return Vec::new();
        }

        let template = Vertex {
            radius: self.effective_radius(),
            width: self.width,
            height: self.height,
            ..Vertex::base(OpCode::Rect, self.color.to_array(), viewport.resolution())
        };
        sdf_quad(
            viewport,
            self.center(),
            self.width * 0.5,
            self.height * 0.5,
            template,
        )
    }
}
