use crate::paint::Color;

/// Placement of a `Canvas::render_text` call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextOptions {
    /// Pen start, pixels from the left edge.
    pub x: f32,
    /// Baseline of the first line, pixels from the top edge.
    pub y: f32,
    /// Pixel size; glyphs are scaled from the font's reference size.
    pub size: f32,
    /// Glyph tint; coverage scales its alpha.
    pub color: Color,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            size: 16.0,
            color: Color::WHITE,
        }
    }
}

impl TextOptions {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self { x, y, size, ..Self::default() }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Placement of a textured quad.
///
/// The source rectangle is in image pixels from the texture's top-left; a
/// zero `rect_width`/`rect_height` selects the rest of the texture on that
/// axis. The drawn size is `desired_*` when non-zero, otherwise the source
/// size times `scale`. `rotation` is in radians, counter-clockwise on screen,
/// about the quad's top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureOptions {
    /// Left edge of the drawn quad, in target pixels.
    pub x: f32,
    /// Top edge of the drawn quad, in target pixels.
    pub y: f32,
    /// Left edge of the source rectangle, in image pixels.
    pub rect_x: u32,
    /// Top edge of the source rectangle, in image pixels.
    pub rect_y: u32,
    /// Source width; `0` runs to the right edge of the texture.
    pub rect_width: u32,
    /// Source height; `0` runs to the bottom edge of the texture.
    pub rect_height: u32,
    /// Drawn width in pixels; `0` uses the source width times `scale`.
    pub desired_width: f32,
    /// Drawn height in pixels; `0` uses the source height times `scale`.
    pub desired_height: f32,
    /// Multiplier for the source size on axes without a desired size.
    pub scale: f32,
    /// Mirrors the image left to right.
    pub flip_x: bool,
    /// Mirrors the image top to bottom.
    pub flip_y: bool,
    /// Radians, counter-clockwise on screen, about the top-left corner.
    pub rotation: f32,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rect_x: 0,
            rect_y: 0,
            rect_width: 0,
            rect_height: 0,
            desired_width: 0.0,
            desired_height: 0.0,
            scale: 1.0,
            flip_x: false,
            flip_y: false,
            rotation: 0.0,
        }
    }
}

impl TextureOptions {
    /// Full texture at its natural size with the top-left at `(x, y)`.
    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y, ..Self::default() }
    }

    /// Stretches the quad to `width × height` pixels.
    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.desired_width = width;
        self.desired_height = height;
        self
    }

    /// Restricts sampling to a sub-rectangle of the texture.
    pub fn region(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.rect_x = x;
        self.rect_y = y;
        self.rect_width = width;
        self.rect_height = height;
        self
    }

    pub fn rotated(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }
}
