use crate::coords::{Vec2, Viewport};
use crate::paint::Color;
use crate::render::Vertex;

use super::flat_vertex;

/// Thick line between two pixel positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
    pub width: f32,
    pub color: Color,
}

impl Segment {
    #[inline]
    pub fn new(from: Vec2, to: Vec2, width: f32, color: Color) -> Self {
        Self { from, to, width, color }
    }

    pub fn vertices(&self, viewport: Viewport) -> Vec<Vertex> {
        if !viewport.is_valid() {
            return Vec::new();
        }

        // Zero-length segments become a one pixel stub along +X.
        let (dir, to) = match (self.to - self.from).try_normalize() {
            Some(dir) => (dir, self.to),
            None => (Vec2::new(1.0, 0.0), self.from + Vec2::new(1.0, 0.0)),
        };

        let offset = dir.perp() * (self.width * 0.5);
        let a = self.from + offset;
        let b = to + offset;
        let c = to - offset;
        let d = self.from - offset;

        let color = self.color.to_array();
        [a, b, c, a, c, d]
            .into_iter()
            .map(|p| flat_vertex(viewport, p, color))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::signed_area;
    use approx::assert_relative_eq;

    fn vp() -> Viewport {
        Viewport::new(100.0, 100.0)
    }

    #[test]
    fn horizontal_segment_is_extruded_vertically() {
        let s = Segment::new(Vec2::new(10.0, 50.0), Vec2::new(90.0, 50.0), 10.0, Color::WHITE);
        let v = s.vertices(vp());
        assert_eq!(v.len(), 6);

        let ys: Vec<f32> = v.iter().map(|x| x.fs_quad_pos[1]).collect();
        let max = ys.iter().cloned().fold(f32::MIN, f32::max);
        let min = ys.iter().cloned().fold(f32::MAX, f32::min);
        // 10px of a 100px target is 0.2 in NDC
        assert_relative_eq!(max - min, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn triangles_are_ccw() {
        let s = Segment::new(Vec2::new(5.0, 5.0), Vec2::new(60.0, 80.0), 4.0, Color::WHITE);
        let v = s.vertices(vp());
        for tri in v.chunks(3) {
            assert!(signed_area(tri[0].fs_quad_pos, tri[1].fs_quad_pos, tri[2].fs_quad_pos) > 0.0);
        }
    }

    #[test]
    fn zero_length_segment_is_finite_and_visible() {
        let p = Vec2::new(40.0, 40.0);
        let v = Segment::new(p, p, 6.0, Color::WHITE).vertices(vp());
        assert_eq!(v.len(), 6);
        assert!(v.iter().all(|x| x.fs_quad_pos.iter().all(|c| c.is_finite())));
        assert!(signed_area(v[0].fs_quad_pos, v[1].fs_quad_pos, v[2].fs_quad_pos).abs() > 0.0);
    }
}
