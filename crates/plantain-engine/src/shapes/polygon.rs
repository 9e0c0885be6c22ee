use crate::coords::{Vec2, Viewport};
use crate::paint::Color;
use crate::render::Vertex;

use super::flat_vertex;

/// Polygon corner with its own color; colors interpolate across the face.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolygonPoint {
    pub pos: Vec2,
    pub color: Color,
}

impl PolygonPoint {
    #[inline]
    pub fn new(pos: Vec2, color: Color) -> Self {
        Self { pos, color }
    }
}

/// Convex polygon, triangulated as a fan around the first point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub points: Vec<PolygonPoint>,
}

impl Polygon {
    pub fn new(points: Vec<PolygonPoint>) -> Self {
        Self { points }
    }

    /// Single-color triangle.
    pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: Color) -> Self {
        Self::new(vec![
            PolygonPoint::new(a, color),
            PolygonPoint::new(b, color),
            PolygonPoint::new(c, color),
        ])
    }

    pub fn vertices(&self, viewport: Viewport) -> Vec<Vertex> {
        if !viewport.is_valid() || self.points.len() < 3 {
            return Vec::new();
        }

        let expanded: Vec<Vertex> = self
            .points
            .iter()
            .map(|p| flat_vertex(viewport, p.pos, p.color.to_array()))
            .collect();

        let mut out = Vec::with_capacity((expanded.len() - 2) * 3);
        for i in 1..expanded.len() - 1 {
            out.push(expanded[0]);
            out.push(expanded[i]);
            out.push(expanded[i + 1]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::OpCode;

    fn vp() -> Viewport {
        Viewport::new(100.0, 100.0)
    }

    #[test]
    fn triangle_emits_three_vertices() {
        let t = Polygon::triangle(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(50.0, 100.0),
            Color::GREEN,
        );
        let v = t.vertices(vp());
        assert_eq!(v.len(), 3);
        assert_eq!(v[0].fs_quad_pos, [-1.0, 1.0]);
        assert_eq!(v[1].fs_quad_pos, [1.0, 1.0]);
        assert_eq!(v[2].fs_quad_pos, [0.0, -1.0]);
        assert!(v.iter().all(|x| x.op() == Some(OpCode::Vertex)));
    }

    #[test]
    fn quad_fans_into_two_triangles() {
        let pts = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
            .into_iter()
            .map(|(x, y)| PolygonPoint::new(Vec2::new(x, y), Color::WHITE))
            .collect();
        let v = Polygon::new(pts).vertices(vp());
        assert_eq!(v.len(), 6);
        assert_eq!(v[0], v[3]);
    }

    #[test]
    fn per_point_colors_are_preserved() {
        let pts = vec![
            PolygonPoint::new(Vec2::new(0.0, 0.0), Color::RED),
            PolygonPoint::new(Vec2::new(10.0, 0.0), Color::GREEN),
            PolygonPoint::new(Vec2::new(0.0, 10.0), Color::BLUE),
        ];
        let v = Polygon::new(pts).vertices(vp());
        assert_eq!(v[0].color, Color::RED.to_array());
        assert_eq!(v[1].color, Color::GREEN.to_array());
        assert_eq!(v[2].color, Color::BLUE.to_array());
    }

    #[test]
    fn fewer_than_three_points_is_empty() {
        let p = Polygon::new(vec![
            PolygonPoint::new(Vec2::zero(), Color::WHITE),
            PolygonPoint::new(Vec2::new(1.0, 1.0), Color::WHITE),
        ]);
        assert!(p.vertices(vp()).is_empty());
        assert!(Polygon::default().vertices(vp()).is_empty());
    }
}
