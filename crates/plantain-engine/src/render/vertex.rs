use bytemuck::{Pod, Zeroable};

/// Selects how the fragment stage shades a vertex's triangle.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpCode {
    /// Flat per-vertex color (polygons, segments).
    Vertex = 1,
    /// Signed-distance circle inside a quad.
    Circle = 2,
    /// Signed-distance rounded rectangle inside a quad.
    Rect = 3,
    /// Glyph atlas coverage × color.
    Text = 4,
    /// Texture sample × color.
    Texture = 5,
}

impl OpCode {
    pub fn from_raw(raw: u32) -> Option<OpCode> {
        match raw {
            1 => Some(OpCode::Vertex),
            2 => Some(OpCode::Circle),
            3 => Some(OpCode::Rect),
            4 => Some(OpCode::Text),
            5 => Some(OpCode::Texture),
            _ => None,
        }
    }
}

/// The single vertex format every draw call is expanded into.
///
/// Layout (80 bytes):
///
///  offset  0  fs_quad_pos    [f32; 2]   loc 0
///  offset  8  shape_pos      [f32; 2]   loc 1
///  offset 16  local_pos      [f32; 2]   loc 2
///  offset 24  op_code        u32        loc 3
///  offset 28  radius         f32        loc 4
///  offset 32  width          f32        loc 5
///  offset 36  height         f32        loc 6
///  offset 40  color          [f32; 4]   loc 7
///  offset 56  resolution     [f32; 2]   loc 8
///  offset 64  tex_coord      [f32; 2]   loc 9
///  offset 72  texture_index  u32        loc 10
///  offset 76  font_index     u32        loc 11
///
/// Fields outside an opcode's contract stay zero; build vertices from
/// [`Vertex::base`] rather than filling every field by hand.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Final clip-space position.
    pub fs_quad_pos: [f32; 2],
    /// Shape anchor in NDC (circle/rect center).
    pub shape_pos: [f32; 2],
    /// Offset from the anchor in pixels, +Y up.
    pub local_pos: [f32; 2],
    pub op_code: u32,
    pub radius: f32,
    pub width: f32,
    pub height: f32,
    pub color: [f32; 4],
    pub resolution: [f32; 2],
    pub tex_coord: [f32; 2],
    pub texture_index: u32,
    pub font_index: u32,
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 12] = wgpu::vertex_attr_array![
        0 => Float32x2,  // fs_quad_pos
        1 => Float32x2,  // shape_pos
        2 => Float32x2,  // local_pos
        3 => Uint32,     // op_code
        4 => Float32,    // radius
        5 => Float32,    // width
        6 => Float32,    // height
        7 => Float32x4,  // color
        8 => Float32x2,  // resolution
        9 => Float32x2,  // tex_coord
        10 => Uint32,    // texture_index
        11 => Uint32     // font_index
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    /// Zeroed vertex carrying only the opcode, color and target resolution.
    #[inline]
    pub fn base(op: OpCode, color: [f32; 4], resolution: [f32; 2]) -> Self {
        Self {
            op_code: op as u32,
            color,
            resolution,
            ..Self::zeroed()
        }
    }

    #[inline]
    pub fn op(&self) -> Option<OpCode> {
        OpCode::from_raw(self.op_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_80_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 80);
    }

    #[test]
    fn layout_stride_matches_struct() {
        assert_eq!(Vertex::layout().array_stride, 80);
        let last = Vertex::ATTRS[11];
        assert_eq!(last.offset, 76);
    }

    #[test]
    fn base_leaves_unrelated_fields_zero() {
        let v = Vertex::base(OpCode::Circle, [1.0, 0.5, 0.25, 1.0], [640.0, 480.0]);
        assert_eq!(v.op(), Some(OpCode::Circle));
        assert_eq!(v.tex_coord, [0.0; 2]);
        assert_eq!(v.texture_index, 0);
        assert_eq!(v.font_index, 0);
        assert_eq!(v.radius, 0.0);
    }

    #[test]
    fn opcode_raw_round_trip() {
        for op in [OpCode::Vertex, OpCode::Circle, OpCode::Rect, OpCode::Text, OpCode::Texture] {
            assert_eq!(OpCode::from_raw(op as u32), Some(op));
        }
        assert_eq!(OpCode::from_raw(0), None);
    }
}
