use image::{imageops, RgbaImage};

use super::TextureError;

/// Edge length of a freshly created atlas.
pub const INITIAL_ATLAS_DIMENSION: u32 = 512;

/// Atlas edges never grow past this.
pub const MAX_ATLAS_DIMENSION: u32 = 8192;

/// Integer rectangle inside an atlas, in pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn overlaps(self, other: AtlasRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Growable RGBA atlas with first-fit, row-major placement.
///
/// Vacancy is decided from the list of placed rectangles; placed rectangles
/// never overlap and never move, so growth only appends space to the right
/// and bottom.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    image: RgbaImage,
    placed: Vec<AtlasRect>,
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self::new(INITIAL_ATLAS_DIMENSION)
    }
}

impl TextureAtlas {
    pub fn new(dimension: u32) -> Self {
        Self {
            image: RgbaImage::new(dimension, dimension),
            placed: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[inline]
    pub fn placed(&self) -> &[AtlasRect] {
        &self.placed
    }

    /// First free `width × height` position scanning rows top to bottom.
    pub fn find_place(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width == 0 || height == 0 || width > self.width() || height > self.height() {
            return None;
        }

        for y in 0..=(self.height() - height) {
            let mut x = 0;
            while x <= self.width() - width {
                let candidate = AtlasRect::new(x, y, width, height);
                match self.placed.iter().find(|r| r.overlaps(candidate)) {
                    // Skip past the blocking rectangle.
                    Some(block) => x = block.right(),
                    None => return Some((x, y)),
                }
            }
        }
        None
    }

    /// Grows to fit an additional `width × height` image.
    ///
    /// Each edge becomes the next power of two of `current + new`, or double
    /// the current edge if that is not larger. Existing pixels stay at their
    /// coordinates.
    pub fn grow(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        let grow_edge = |current: u32, extra: u32| -> u32 {
            let wanted = current.saturating_add(extra).checked_next_power_of_two().unwrap_or(u32::MAX);
            if wanted <= current { current.saturating_mul(2) } else { wanted }
        };

        let new_w = grow_edge(self.width(), width);
        let new_h = grow_edge(self.height(), height);
        let requested = new_w.max(new_h);
        if requested > MAX_ATLAS_DIMENSION {
            return Err(TextureError::AtlasFull { requested, max: MAX_ATLAS_DIMENSION });
        }

        let mut grown = RgbaImage::new(new_w, new_h);
        imageops::replace(&mut grown, &self.image, 0, 0);
        self.image = grown;

        log::debug!("texture atlas grown to {new_w}x{new_h}");
        Ok(())
    }

    /// Places `image` at the first free spot, growing once if needed.
    pub fn insert(&mut self, image: &RgbaImage) -> Result<AtlasRect, TextureError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::EmptyImage);
        }

        let (w, h) = image.dimensions();
        let (x, y) = match self.find_place(w, h) {
            Some(pos) => pos,
            None => {
                self.grow(w, h)?;
                self.find_place(w, h).ok_or(TextureError::AtlasFull {
                    requested: self.width().max(self.height()),
                    max: MAX_ATLAS_DIMENSION,
                })?
            }
        };

        let rect = AtlasRect::new(x, y, w, h);
        imageops::replace(&mut self.image, image, i64::from(x), i64::from(y));
        self.placed.push(rect);
        Ok(rect)
    }

    /// Writes `image` at `(dx, dy)` relative to `rect`, clipped to `rect`.
    ///
    /// Returns `true` when part of `image` was clipped away.
    pub fn write_into(&mut self, rect: AtlasRect, image: &RgbaImage, dx: i64, dy: i64) -> bool {
        let ox = i64::from(rect.x) + dx;
        let oy = i64::from(rect.y) + dy;
        let (iw, ih) = (i64::from(image.width()), i64::from(image.height()));

        let x0 = ox.max(i64::from(rect.x));
        let y0 = oy.max(i64::from(rect.y));
        let x1 = (ox + iw).min(i64::from(rect.right().min(self.width())));
        let y1 = (oy + ih).min(i64::from(rect.bottom().min(self.height())));

        if x1 <= x0 || y1 <= y0 {
            return true;
        }
        let clipped = x0 != ox || y0 != oy || x1 != ox + iw || y1 != oy + ih;

        if clipped {
            let visible = imageops::crop_imm(
                image,
                (x0 - ox) as u32,
                (y0 - oy) as u32,
                (x1 - x0) as u32,
                (y1 - y0) as u32,
            )
            .to_image();
            imageops::replace(&mut self.image, &visible, x0, y0);
        } else {
            imageops::replace(&mut self.image, image, ox, oy);
        }
        clipped
    }
}
