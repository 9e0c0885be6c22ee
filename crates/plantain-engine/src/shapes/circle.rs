use crate::coords::{Vec2, Viewport};
use crate::paint::Color;
use crate::render::{OpCode, Vertex};

use super::sdf_quad;

/// Filled circle; `center` is in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl Circle {
    #[inline]
    pub fn new(center: Vec2, radius: f32, color: Color) -> Self {
        Self { center, radius, color }
    }

    pub fn vertices(&self, viewport: Viewport) -> Vec<Vertex> {
        if !viewport.is_valid() {
            return Vec::new();
        }

        let r = self.radius.max(0.0);
        let template = Vertex {
            radius: r,
            width: r * 2.0,
            height: r * 2.0,
            ..Vertex::base(OpCode::Circle, self.color.to_array(), viewport.resolution())
        };
        sdf_quad(viewport, self.center, r, r, template)
    }
}
