/// Maps a pixel position to normalized device coordinates.
///
/// `(0, 0)` is the top-left corner and maps to `(-1, 1)`; `(width, height)`
/// maps to `(1, -1)`. Y is flipped because pixel rows grow downward while NDC
/// grows upward.
#[inline]
pub fn to_ndc(x: f32, y: f32, width: f32, height: f32) -> [f32; 2] {
    [(x / width) * 2.0 - 1.0, 1.0 - (y / height) * 2.0]
}

/// Inverse of [`to_ndc`].
#[inline]
pub fn from_ndc(nx: f32, ny: f32, width: f32, height: f32) -> [f32; 2] {
    [(nx + 1.0) * 0.5 * width, (1.0 - ny) * 0.5 * height]
}
