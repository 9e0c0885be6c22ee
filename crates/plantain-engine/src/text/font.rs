use std::collections::HashMap;

use super::glyph_atlas::{pad_and_smooth, GlyphAtlas, SMOOTH_MARGIN};
use super::FontError;

/// Pixel size glyphs are rasterized at.
pub const REFERENCE_PX: f32 = 32.0;

/// First character loaded into the atlas.
pub const FIRST_CHAR: char = ' ';

/// Last character loaded into the atlas.
pub const LAST_CHAR: char = '~';

/// Placement data for one rasterized character.
///
/// All metrics are in pixels at [`REFERENCE_PX`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    pub ch: char,
    /// `[u0, v0, u1, v1]` in the glyph atlas, `v0` at the glyph's top.
    pub tex_coords: [f32; 4],
    pub advance: f32,
    /// Pen position → left edge of the bitmap.
    pub bearing_x: f32,
    /// Baseline → top edge of the bitmap, positive upward.
    pub bearing_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Glyph {
    /// Glyphs without coverage (space) advance the pen but emit no quad.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// A parsed font plus its pre-rasterized ASCII glyph atlas.
pub struct Font {
    inner: fontdue::Font,
    glyphs: HashMap<char, Glyph>,
    atlas: GlyphAtlas,
    line_height: f32,
    ascent: f32,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("glyphs", &self.glyphs.len())
            .field("line_height", &self.line_height)
            .finish_non_exhaustive()
    }
}

impl Font {
    /// Parses a TrueType/OpenType font and rasterizes `' '..='~'`.
    ///
    /// Characters the font does not map are logged and left out. Fails if
    /// the font cannot be parsed or the glyphs overflow the atlas.
    pub fn load(bytes: &[u8]) -> Result<Font, FontError> {
        let inner = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;

        let mut atlas = GlyphAtlas::default();
        let mut glyphs = HashMap::new();

        for ch in FIRST_CHAR..=LAST_CHAR {
            let index = inner.lookup_glyph_index(ch);
            if index == 0 {
                log::debug!("font has no glyph for {ch:?}, skipping");
                continue;
            }

            let (metrics, coverage) = inner.rasterize_indexed(index, REFERENCE_PX);
            let mut bearing_x = metrics.xmin as f32;
            let mut bearing_y = (metrics.ymin + metrics.height as i32) as f32;

            let (w, h, tex_coords) = if metrics.width == 0 || metrics.height == 0 {
                (0, 0, [0.0; 4])
            } else {
                let (w, h, smoothed) = pad_and_smooth(metrics.width, metrics.height, &coverage);
                let rect = atlas
                    .pack(w as u32, h as u32, &smoothed)
                    .ok_or(FontError::AtlasOverflow { ch })?;
                // The margin grows the bitmap outward on every side.
                bearing_x -= SMOOTH_MARGIN as f32;
                bearing_y += SMOOTH_MARGIN as f32;
                (w, h, atlas.uv(rect))
            };

            glyphs.insert(
                ch,
                Glyph {
                    ch,
                    tex_coords,
                    advance: metrics.advance_width,
                    bearing_x,
                    bearing_y,
                    width: w as f32,
                    height: h as f32,
                },
            );
        }

        let (line_height, ascent) = match inner.horizontal_line_metrics(REFERENCE_PX) {
            Some(lm) => (lm.new_line_size, lm.ascent),
            None => (REFERENCE_PX * 1.2, REFERENCE_PX),
        };

        log::info!("loaded font with {} glyphs", glyphs.len());

        Ok(Font { inner, glyphs, atlas, line_height, ascent })
    }

    #[inline]
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    #[inline]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    /// Baseline-to-baseline distance at [`REFERENCE_PX`].
    #[inline]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Baseline-to-top distance at [`REFERENCE_PX`].
    #[inline]
    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    /// Horizontal kerning between `left` and `right` at `px`.
    pub fn kerning(&self, left: char, right: char, px: f32) -> Result<f32, FontError> {
        for ch in [left, right] {
            if self.inner.lookup_glyph_index(ch) == 0 {
                return Err(FontError::MissingGlyph(ch));
            }
        }
        self.inner
            .horizontal_kern(left, right, px)
            .ok_or(FontError::NoKerning { left, right })
    }

    /// Width of the widest line of `text` at `size`, using the same layout
    /// rules as `Canvas::render_text`.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let scale = size / REFERENCE_PX;
        let mut widest = 0.0f32;
        let mut pen = 0.0f32;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            if ch == '\n' {
                widest = widest.max(pen);
                pen = 0.0;
                prev = None;
                continue;
            }
            let Some(glyph) = self.glyph(ch) else { continue };
            if let Some(p) = prev {
                pen += self.kerning(p, ch, REFERENCE_PX).unwrap_or(0.0) * scale;
            }
            pen += glyph.advance * scale;
            prev = Some(ch);
        }
        widest.max(pen)
    }
}

#[cfg(test)]
pub(crate) fn test_font() -> Font {
    Font::load(include_bytes!("../../tests/fixtures/DejaVuSansMono.ttf"))
        .expect("fixture font loads")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ── loading ───────────────────────────────────────────────────────────

    #[test]
    fn loads_printable_ascii() {
        let font = test_font();
        assert_eq!(font.glyph_count(), 95);
        for ch in FIRST_CHAR..=LAST_CHAR {
            assert!(font.glyph(ch).is_some(), "missing {ch:?}");
        }
    }

    #[test]
    fn non_ascii_is_not_cached() {
        let font = test_font();
        assert!(font.glyph('é').is_none());
        assert!(font.glyph('\n').is_none());
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let err = Font::load(b"definitely not a font").unwrap_err();
        assert!(matches!(err, FontError::Parse(_)));
    }

    // ── glyph metrics ─────────────────────────────────────────────────────

    #[test]
    fn space_advances_the_pen() {
        let font = test_font();
        let space = font.glyph(' ').unwrap();
        assert!(space.advance > 0.0);
        assert_relative_eq!(space.advance, font.glyph('x').unwrap().advance, epsilon = 1e-3);
    }

    #[test]
    fn letter_has_atlas_region() {
        let font = test_font();
        let a = font.glyph('A').unwrap();
        assert!(!a.is_blank());
        let [u0, v0, u1, v1] = a.tex_coords;
        assert!(u1 > u0 && v1 > v0);
        assert!(u1 <= 1.0 && v1 <= 1.0);
        // cap height sits above the baseline
        assert!(a.bearing_y > 0.0);
    }

    #[test]
    fn smoothing_margin_grows_the_glyph_outward() {
        let font = test_font();
        let index = font.inner.lookup_glyph_index('A');
        let metrics = font.inner.metrics_indexed(index, REFERENCE_PX);
        let a = font.glyph('A').unwrap();

        let margin = SMOOTH_MARGIN as f32;
        assert_eq!(a.width, metrics.width as f32 + 2.0 * margin);
        assert_eq!(a.height, metrics.height as f32 + 2.0 * margin);
        assert_eq!(a.bearing_x, metrics.xmin as f32 - margin);
        assert_eq!(a.bearing_y, (metrics.ymin + metrics.height as i32) as f32 + margin);
        // the outline still sits on the same baseline
        assert_eq!(a.bearing_y - a.height, metrics.ymin as f32 - margin);
    }

    #[test]
    fn monospace_advances_match() {
        let font = test_font();
        let i = font.glyph('i').unwrap().advance;
        let w = font.glyph('W').unwrap().advance;
        assert_relative_eq!(i, w, epsilon = 1e-3);
    }

    // ── kerning ───────────────────────────────────────────────────────────

    #[test]
    fn kerning_with_missing_glyph_fails() {
        let font = test_font();
        assert_eq!(font.kerning('A', '中', REFERENCE_PX), Err(FontError::MissingGlyph('中')));
    }

    #[test]
    fn kerning_falls_back_to_zero() {
        let font = test_font();
        let k = font.kerning('A', 'V', REFERENCE_PX).unwrap_or(0.0);
        assert!(k.is_finite());
    }

    // ── measure ───────────────────────────────────────────────────────────

    #[test]
    fn measure_scales_with_size() {
        let font = test_font();
        let small = font.measure("abc", 16.0);
        let big = font.measure("abc", 32.0);
        assert_relative_eq!(big, small * 2.0, epsilon = 1e-3);
    }

    #[test]
    fn measure_uses_widest_line() {
        let font = test_font();
        let one = font.measure("abcd", 32.0);
        assert_relative_eq!(font.measure("ab\nabcd\na", 32.0), one, epsilon = 1e-3);
    }
}
