//! Shape adapters: pure conversions from pixel-space shapes to [`Vertex`] lists.
//!
//! Every adapter is total for a valid viewport and performs no GPU work. An
//! invalid viewport (zero or non-finite size) yields no vertices.

mod circle;
mod polygon;
mod rect;
mod segment;

pub use circle::Circle;
pub use polygon::{Polygon, PolygonPoint};
pub use rect::Rect;
pub use segment::Segment;

use crate::coords::{Vec2, Viewport};
use crate::render::{OpCode, Vertex};

/// Closed set of drawable shapes accepted by `Canvas::render`.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rect(Rect),
    Polygon(Polygon),
    Segment(Segment),
}

impl Shape {
    /// Expands the shape into vertices for a target of size `viewport`.
    pub fn vertices(&self, viewport: Viewport) -> Vec<Vertex> {
        match self {
            Shape::Circle(c) => c.vertices(viewport),
            Shape::Rect(r) => r.vertices(viewport),
            Shape::Polygon(p) => p.vertices(viewport),
            Shape::Segment(s) => s.vertices(viewport),
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Rect> for Shape {
    fn from(r: Rect) -> Self {
        Shape::Rect(r)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Shape::Polygon(p)
    }
}

impl From<Segment> for Shape {
    fn from(s: Segment) -> Self {
        Shape::Segment(s)
    }
}

// ── quad helper ───────────────────────────────────────────────────────────

/// Local corner offsets of a centered quad (+Y up), two CCW triangles.
const QUAD_CORNERS: [(f32, f32); 6] = [
    (-1.0, 1.0),
    (-1.0, -1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (1.0, 1.0),
];

/// Emits six vertices of an SDF quad centered on `center` (pixels).
///
/// `local_pos` carries the pixel offset from the center so the fragment stage
/// can evaluate the shape's distance function.
pub(crate) fn sdf_quad(
    viewport: Viewport,
    center: Vec2,
    half_w: f32,
    half_h: f32,
    mut template: Vertex,
) -> Vec<Vertex> {
    let shape_pos = viewport.to_ndc(center);
    template.shape_pos = shape_pos;
    template.resolution = viewport.resolution();

    QUAD_CORNERS
        .iter()
        .map(|&(sx, sy)| {
            let lx = sx * half_w;
            let ly = sy * half_h;
            Vertex {
                fs_quad_pos: [
                    shape_pos[0] + lx / viewport.width * 2.0,
                    shape_pos[1] + ly / viewport.height * 2.0,
                ],
                local_pos: [lx, ly],
                ..template
            }
        })
        .collect()
}

/// Flat-shaded vertex at a pixel position.
pub(crate) fn flat_vertex(viewport: Viewport, p: Vec2, color: [f32; 4]) -> Vertex {
    let ndc = viewport.to_ndc(p);
    Vertex {
        fs_quad_pos: ndc,
        shape_pos: ndc,
        ..Vertex::base(OpCode::Vertex, color, viewport.resolution())
    }
}

#[cfg(test)]
pub(crate) fn signed_area(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}
