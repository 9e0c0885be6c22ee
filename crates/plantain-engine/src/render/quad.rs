//! Textured quad emission shared by glyphs, atlas textures and framebuffers.

use crate::coords::{Vec2, Viewport};
use crate::texture::{AtlasRect, RowOrder, TextureSource};

use super::Vertex;

/// Texture coordinate at each edge of a quad.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct EdgeUv {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl EdgeUv {
    /// From a top-down `[u0, v0, u1, v1]` rectangle.
    pub fn from_rect([u0, v0, u1, v1]: [f32; 4]) -> Self {
        Self { left: u0, right: u1, top: v0, bottom: v1 }
    }

    /// Maps `region` (image pixels, top-left origin) of `source` to the UVs
    /// that draw it upright.
    pub fn for_source(source: &TextureSource, region: AtlasRect) -> Self {
        let (tw, th) = (source.texture_size.0 as f32, source.texture_size.1 as f32);
        let alloc = source.rect;

        let left = (alloc.x + region.x) as f32 / tw;
        let right = (alloc.x + region.right()) as f32 / tw;

        let (top, bottom) = match source.rows {
            RowOrder::TopDown => (
                (alloc.y + region.y) as f32 / th,
                (alloc.y + region.bottom()) as f32 / th,
            ),
            // The image's first row is stored at the allocation's last row.
            RowOrder::BottomUp => (
                (alloc.bottom() - region.y) as f32 / th,
                (alloc.bottom() - region.bottom()) as f32 / th,
            ),
        };

        Self { left, right, top, bottom }
    }

    pub fn flipped(self, flip_x: bool, flip_y: bool) -> Self {
        let (left, right) = if flip_x { (self.right, self.left) } else { (self.left, self.right) };
        let (top, bottom) = if flip_y { (self.bottom, self.top) } else { (self.top, self.bottom) };
        Self { left, right, top, bottom }
    }
}

/// Clamps a requested source region to the allocation of `source`.
///
/// Zero width/height selects everything from the offset to the far edge.
/// Returns `None` when nothing of the texture remains.
pub(crate) fn clamp_region(source: &TextureSource, x: u32, y: u32, w: u32, h: u32) -> Option<AtlasRect> {
    let (aw, ah) = (source.rect.width, source.rect.height);
    let x = x.min(aw);
    let y = y.min(ah);
    let w = if w == 0 { aw - x } else { w.min(aw - x) };
    let h = if h == 0 { ah - y } else { h.min(ah - y) };
    (w > 0 && h > 0).then(|| AtlasRect::new(x, y, w, h))
}

/// Six vertices of a `size` quad whose top-left is at `origin` (pixels).
///
/// `rotation` turns the quad counter-clockwise on screen around `origin`.
/// Corners are emitted as two counter-clockwise triangles in NDC.
pub(crate) fn quad(
    viewport: Viewport,
    origin: Vec2,
    size: Vec2,
    rotation: f32,
    uv: EdgeUv,
    template: Vertex,
) -> [Vertex; 6] {
    let template = Vertex {
        shape_pos: viewport.to_ndc(origin),
        width: size.x,
        height: size.y,
        resolution: viewport.resolution(),
        ..template
    };
    let corner = |lx: f32, ly: f32, u: f32, v: f32| {
        // Rotate in a +Y-up frame, then return to screen space.
        let up = Vec2::new(lx, -ly).rotated(rotation);
        let p = origin + Vec2::new(up.x, -up.y);
        Vertex {
            fs_quad_pos: viewport.to_ndc(p),
            local_pos: [up.x, up.y],
            tex_coord: [u, v],
            ..template
        }
    };

    let tl = corner(0.0, 0.0, uv.left, uv.top);
    let bl = corner(0.0, size.y, uv.left, uv.bottom);
    let br = corner(size.x, size.y, uv.right, uv.bottom);
    let tr = corner(size.x, 0.0, uv.right, uv.top);
    [tl, bl, br, tl, br, tr]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::OpCode;
    use crate::shapes::signed_area;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    fn template() -> Vertex {
        Vertex::base(OpCode::Texture, [1.0; 4], [0.0, 0.0])
    }

    fn source(rows: RowOrder) -> TextureSource {
        TextureSource {
            slot: 1,
            rect: AtlasRect::new(0, 0, 64, 32),
            texture_size: (128, 128),
            rows,
        }
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn quad_is_counter_clockwise() {
        let vp = Viewport::new(200.0, 100.0);
        let uv = EdgeUv::from_rect([0.0, 0.0, 1.0, 1.0]);
        let q = quad(vp, Vec2::new(10.0, 10.0), Vec2::new(40.0, 20.0), 0.0, uv, template());

        for tri in q.chunks(3) {
            let area = signed_area(tri[0].fs_quad_pos, tri[1].fs_quad_pos, tri[2].fs_quad_pos);
            assert!(area > 0.0);
        }
        assert_eq!(q[0].resolution, [200.0, 100.0]);
        assert_eq!(q[0].width, 40.0);
    }

    #[test]
    fn unrotated_corners_land_on_pixels() {
        let vp = Viewport::new(100.0, 100.0);
        let uv = EdgeUv::from_rect([0.0, 0.0, 1.0, 1.0]);
        let q = quad(vp, Vec2::new(0.0, 0.0), Vec2::new(50.0, 50.0), 0.0, uv, template());

        assert_abs_diff_eq!(q[0].fs_quad_pos[0], -1.0);
        assert_abs_diff_eq!(q[0].fs_quad_pos[1], 1.0);
        assert_abs_diff_eq!(q[2].fs_quad_pos[0], 0.0);
        assert_abs_diff_eq!(q[2].fs_quad_pos[1], 0.0);
    }

    #[test]
    fn rotation_pivots_on_top_left() {
        let vp = Viewport::new(100.0, 100.0);
        let uv = EdgeUv::from_rect([0.0, 0.0, 1.0, 1.0]);
        let origin = Vec2::new(50.0, 50.0);
        let q = quad(vp, origin, Vec2::new(10.0, 10.0), FRAC_PI_2, uv, template());

        // Top-left stays put.
        assert_abs_diff_eq!(q[0].fs_quad_pos[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(q[0].fs_quad_pos[1], 0.0, epsilon = 1e-6);

        // A quarter turn counter-clockwise swings the top-right corner
        // straight up: (60, 50) -> (50, 40) in pixels.
        let tr = q[5].fs_quad_pos;
        assert_abs_diff_eq!(tr[0], 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(tr[1], 0.2, epsilon = 1e-5);
    }

    // ── texture coordinates ───────────────────────────────────────────────

    #[test]
    fn bottom_up_source_samples_upright() {
        let uv = EdgeUv::for_source(&source(RowOrder::BottomUp), AtlasRect::new(0, 0, 64, 32));
        assert_abs_diff_eq!(uv.top, 0.25);
        assert_abs_diff_eq!(uv.bottom, 0.0);
        assert_abs_diff_eq!(uv.right, 0.5);
    }

    #[test]
    fn top_down_source_samples_upright() {
        let uv = EdgeUv::for_source(&source(RowOrder::TopDown), AtlasRect::new(0, 8, 64, 8));
        assert_abs_diff_eq!(uv.top, 8.0 / 128.0);
        assert_abs_diff_eq!(uv.bottom, 16.0 / 128.0);
    }

    #[test]
    fn flips_swap_edges() {
        let uv = EdgeUv::from_rect([0.1, 0.2, 0.3, 0.4]).flipped(true, true);
        assert_eq!(uv, EdgeUv { left: 0.3, right: 0.1, top: 0.4, bottom: 0.2 });
    }

    #[test]
    fn zero_region_selects_whole_texture() {
        let src = source(RowOrder::TopDown);
        assert_eq!(clamp_region(&src, 0, 0, 0, 0), Some(AtlasRect::new(0, 0, 64, 32)));
        assert_eq!(clamp_region(&src, 16, 0, 0, 8), Some(AtlasRect::new(16, 0, 48, 8)));
    }

    #[test]
    fn region_is_clamped_to_allocation() {
        let src = source(RowOrder::TopDown);
        assert_eq!(clamp_region(&src, 60, 30, 10, 10), Some(AtlasRect::new(60, 30, 4, 2)));
        assert_eq!(clamp_region(&src, 64, 0, 0, 0), None);
    }
}
