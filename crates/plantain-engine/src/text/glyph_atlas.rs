use crate::texture::AtlasRect;

/// Edge length of the glyph atlas.
pub const GLYPH_ATLAS_DIMENSION: u32 = 512;

/// Empty pixels between neighbouring glyphs.
pub const GLYPH_PADDING: u32 = 1;

/// Single-channel coverage atlas packed in rows.
///
/// Glyphs are placed left to right; when a glyph does not fit the current
/// row the cursor wraps below the tallest glyph of that row.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
}

impl Default for GlyphAtlas {
    fn default() -> Self {
        Self::new(GLYPH_ATLAS_DIMENSION, GLYPH_ATLAS_DIMENSION)
    }
}

impl GlyphAtlas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage bytes, one per texel, rows top to bottom.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Packs a `w × h` coverage bitmap. Returns `None` when the atlas is full.
    pub fn pack(&mut self, w: u32, h: u32, coverage: &[u8]) -> Option<AtlasRect> {
        debug_assert_eq!(coverage.len(), w as usize * h as usize);

        if self.cursor_x + w + GLYPH_PADDING > self.width {
            self.cursor_x = 0;
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.row_height = 0;
        }
        if self.cursor_y + h + GLYPH_PADDING > self.height || w + GLYPH_PADDING > self.width {
            return None;
        }

        let (gx, gy) = (self.cursor_x, self.cursor_y);
        for row in 0..h as usize {
            let src = &coverage[row * w as usize..(row + 1) * w as usize];
            let d = (gy as usize + row) * self.width as usize + gx as usize;
            self.pixels[d..d + w as usize].copy_from_slice(src);
        }

        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        Some(AtlasRect::new(gx, gy, w, h))
    }

    /// Normalized `[u0, v0, u1, v1]` of a packed rectangle.
    pub fn uv(&self, rect: AtlasRect) -> [f32; 4] {
        let (aw, ah) = (self.width as f32, self.height as f32);
        [
            rect.x as f32 / aw,
            rect.y as f32 / ah,
            rect.right() as f32 / aw,
            rect.bottom() as f32 / ah,
        ]
    }
}

/// Empty border added on every side of a glyph before smoothing, so the
/// kernel's spill past the outline is kept.
pub const SMOOTH_MARGIN: usize = 1;

/// Surrounds a `w × h` coverage bitmap with [`SMOOTH_MARGIN`] empty texels
/// and smooths it. Returns the grown size and the coverage.
pub(crate) fn pad_and_smooth(w: usize, h: usize, src: &[u8]) -> (usize, usize, Vec<u8>) {
    let (pw, ph) = (w + 2 * SMOOTH_MARGIN, h + 2 * SMOOTH_MARGIN);
    let mut padded = vec![0u8; pw * ph];
    for (row, line) in src.chunks_exact(w).enumerate().take(h) {
        let d = (row + SMOOTH_MARGIN) * pw + SMOOTH_MARGIN;
        padded[d..d + w].copy_from_slice(line);
    }
    (pw, ph, smooth_coverage(pw, ph, &padded))
}

/// Smooths coverage with the 3×3 kernel `[1 2 1; 2 4 2; 1 2 1] / 16`.
///
/// Texels outside the bitmap count as empty, so the output keeps the input
/// size.
pub(crate) fn smooth_coverage(w: usize, h: usize, src: &[u8]) -> Vec<u8> {
    const KERNEL: [[u32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u32;
            for (ky, krow) in KERNEL.iter().enumerate() {
                for (kx, k) in krow.iter().enumerate() {
                    let sx = x as isize + kx as isize - 1;
                    let sy = y as isize + ky as isize - 1;
                    if sx < 0 || sy < 0 || sx >= w as isize || sy >= h as isize {
                        continue;
                    }
                    acc += k * src[sy as usize * w + sx as usize] as u32;
                }
            }
            out[y * w + x] = (acc / 16) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── packing ───────────────────────────────────────────────────────────

    #[test]
    fn pack_advances_with_padding() {
        let mut atlas = GlyphAtlas::new(64, 64);
        let a = atlas.pack(10, 12, &[255; 120]).unwrap();
        let b = atlas.pack(5, 5, &[128; 25]).unwrap();
        assert_eq!(a, AtlasRect::new(0, 0, 10, 12));
        assert_eq!(b, AtlasRect::new(11, 0, 5, 5));
        assert_eq!(atlas.coverage(0, 0), 255);
        assert_eq!(atlas.coverage(10, 0), 0);
        assert_eq!(atlas.coverage(11, 0), 128);
    }

    #[test]
    fn pack_wraps_below_tallest_glyph() {
        let mut atlas = GlyphAtlas::new(32, 64);
        atlas.pack(20, 8, &[1; 160]).unwrap();
        atlas.pack(5, 14, &[1; 70]).unwrap();
        let c = atlas.pack(20, 4, &[1; 80]).unwrap();
        assert_eq!(c, AtlasRect::new(0, 15, 20, 4));
    }

    #[test]
    fn pack_reports_overflow() {
        let mut atlas = GlyphAtlas::new(16, 16);
        assert!(atlas.pack(15, 15, &[1; 225]).is_some());
        assert!(atlas.pack(15, 15, &[1; 225]).is_none());
    }

    #[test]
    fn uv_is_normalized() {
        let atlas = GlyphAtlas::new(512, 512);
        assert_eq!(atlas.uv(AtlasRect::new(256, 0, 256, 128)), [0.5, 0.0, 1.0, 0.25]);
    }

    // ── smoothing ─────────────────────────────────────────────────────────

    #[test]
    fn smoothing_spreads_a_single_texel() {
        let mut src = vec![0u8; 9];
        src[4] = 160;
        let out = smooth_coverage(3, 3, &src);
        assert_eq!(out[4], 40); // 160 * 4 / 16
        assert_eq!(out[1], 20); // edge neighbour, weight 2
        assert_eq!(out[0], 10); // corner neighbour, weight 1
    }

    #[test]
    fn padding_keeps_the_spill_past_the_outline() {
        let (w, h, out) = pad_and_smooth(1, 1, &[160]);
        assert_eq!((w, h), (3, 3));
        assert_eq!(out[4], 40);
        assert_eq!(out[1], 20);
        assert_eq!(out[0], 10);
        assert_eq!(out.iter().map(|&c| u32::from(c)).sum::<u32>(), 160);
    }

    #[test]
    fn padding_places_the_glyph_in_the_middle() {
        let (w, h, out) = pad_and_smooth(4, 2, &[255; 8]);
        assert_eq!((w, h), (6, 4));
        // texels inside the outline outweigh the border
        assert!(out[w + 2] > out[w]);
        assert_eq!(out[0], 255 / 16);
    }

    #[test]
    fn smoothing_keeps_uniform_interior() {
        let out = smooth_coverage(5, 5, &[200; 25]);
        assert_eq!(out[12], 200);
        // corners lose the out-of-bounds weight
        assert!(out[0] < 200);
    }
}
