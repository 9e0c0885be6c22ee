use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;

use image::{imageops, RgbaImage};

use super::{AtlasRect, TextureAtlas, TextureError, ATLAS_SLOT};

/// Framebuffer texture handles count up from here so they can never collide
/// with atlas handles, which count up from 1.
pub const FRAMEBUFFER_HANDLE_BASE: u32 = 0x8000_0000;

/// Opaque texture id. Zero is never a valid handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TextureHandle(NonZeroU32);

impl TextureHandle {
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    #[inline]
    pub fn is_framebuffer(self) -> bool {
        self.get() >= FRAMEBUFFER_HANDLE_BASE
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.get())
    }
}

/// Row order of a sampled texture relative to the source image.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RowOrder {
    /// Stored flipped: the image's top row sits at the highest texel row.
    BottomUp,
    /// Stored as rendered: row 0 is the top.
    TopDown,
}

/// Where a handle's pixels live when sampling.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureSource {
    /// Sampler slot in the primitive shader.
    pub slot: u32,
    /// Region occupied inside the sampled texture.
    pub rect: AtlasRect,
    /// Full size of the sampled texture.
    pub texture_size: (u32, u32),
    pub rows: RowOrder,
}

#[derive(Debug, Copy, Clone)]
struct FramebufferTexture {
    slot: u32,
    width: u32,
    height: u32,
}

/// Issues texture handles and owns the RGBA atlas.
///
/// Atlas handles increase monotonically from 1, framebuffer handles from
/// [`FRAMEBUFFER_HANDLE_BASE`]; neither is ever reused. Every upload is
/// flipped vertically before it is placed.
#[derive(Debug)]
pub struct TextureManager {
    atlas: TextureAtlas,
    bounds: HashMap<TextureHandle, AtlasRect>,
    framebuffers: HashMap<TextureHandle, FramebufferTexture>,
    next_handle: u32,
    next_framebuffer_handle: u32,
    generation: u64,
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureManager {
    pub fn new() -> Self {
        Self::with_atlas(TextureAtlas::default())
    }

    pub fn with_atlas(atlas: TextureAtlas) -> Self {
        Self {
            atlas,
            bounds: HashMap::new(),
            framebuffers: HashMap::new(),
            next_handle: 1,
            next_framebuffer_handle: FRAMEBUFFER_HANDLE_BASE,
            generation: 0,
        }
    }

    #[inline]
    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    /// Bumped whenever atlas pixels or dimensions change.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Atlas rectangle of an uploaded texture.
    pub fn bounds(&self, handle: TextureHandle) -> Option<AtlasRect> {
        self.bounds.get(&handle).copied()
    }

    /// Places `image` into the atlas and returns its handle.
    pub fn upload(&mut self, image: &RgbaImage) -> Result<TextureHandle, TextureError> {
        let raw = self.next_handle;
        let handle = match NonZeroU32::new(raw) {
            Some(h) if raw < FRAMEBUFFER_HANDLE_BASE => TextureHandle(h),
            _ => {
                log::error!("texture upload failed: {}", TextureError::HandlesExhausted);
                return Err(TextureError::HandlesExhausted);
            }
        };

        let flipped = imageops::flip_vertical(image);
        let rect = self.atlas.insert(&flipped).inspect_err(|e| {
            log::error!("texture upload of {}x{} failed: {e}", image.width(), image.height());
        })?;

        self.next_handle += 1;
        self.bounds.insert(handle, rect);
        self.generation += 1;

        log::info!(
            "uploaded texture {handle} ({}x{}) at ({}, {})",
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        Ok(handle)
    }

    /// Overwrites part of an uploaded texture.
    ///
    /// `(dx, dy)` is measured from the texture's top-left in image space. The
    /// write is clipped to the texture's allocation; it never resizes it.
    pub fn update(
        &mut self,
        handle: TextureHandle,
        image: &RgbaImage,
        dx: i32,
        dy: i32,
    ) -> Result<(), TextureError> {
        let Some(rect) = self.bounds.get(&handle).copied() else {
            log::warn!("texture update skipped: unknown handle {handle}");
            return Err(TextureError::UnknownHandle(handle));
        };
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::EmptyImage);
        }

        // Stored rows are flipped, so image row `dy` lands `dy` rows above the
        // allocation's last row.
        let flipped = imageops::flip_vertical(image);
        let stored_dy = rect.height as i64 - dy as i64 - image.height() as i64;

        if self.atlas.write_into(rect, &flipped, dx as i64, stored_dy) {
            log::warn!(
                "texture update for {handle} clipped to its {}x{} allocation",
                rect.width,
                rect.height
            );
        }
        self.generation += 1;
        Ok(())
    }

    // ── framebuffer textures ──────────────────────────────────────────────

    pub(crate) fn register_framebuffer(
        &mut self,
        slot: u32,
        width: u32,
        height: u32,
    ) -> Option<TextureHandle> {
        let handle = NonZeroU32::new(self.next_framebuffer_handle).map(TextureHandle)?;
        self.next_framebuffer_handle = self.next_framebuffer_handle.checked_add(1)?;
        self.framebuffers.insert(handle, FramebufferTexture { slot, width, height });
        log::info!("registered framebuffer texture {handle} ({width}x{height}, slot {slot})");
        Some(handle)
    }

    pub(crate) fn resize_framebuffer(&mut self, handle: TextureHandle, width: u32, height: u32) {
        if let Some(fb) = self.framebuffers.get_mut(&handle) {
            fb.width = width;
            fb.height = height;
        }
    }

    pub(crate) fn unregister_framebuffer(&mut self, handle: TextureHandle) {
        self.framebuffers.remove(&handle);
    }

    /// Resolves any handle (atlas or framebuffer) to its sampling source.
    pub fn resolve(&self, handle: TextureHandle) -> Option<TextureSource> {
        if let Some(rect) = self.bounds.get(&handle) {
            return Some(TextureSource {
                slot: ATLAS_SLOT,
                rect: *rect,
                texture_size: (self.atlas.width(), self.atlas.height()),
                rows: RowOrder::BottomUp,
            });
        }

        self.framebuffers.get(&handle).map(|fb| TextureSource {
            slot: fb.slot,
            rect: AtlasRect::new(0, 0, fb.width, fb.height),
            texture_size: (fb.width, fb.height),
            rows: RowOrder::TopDown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn solid(w: u32, h: u32, px: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(w, h, px)
    }

    fn atlas_pixel(tm: &TextureManager, x: u32, y: u32) -> Rgba<u8> {
        *tm.atlas().image().get_pixel(x, y)
    }

    // ── upload ────────────────────────────────────────────────────────────

    #[test]
    fn first_upload_gets_handle_one_at_origin() {
        let mut tm = TextureManager::new();
        let h = tm.upload(&solid(32, 32, RED)).unwrap();
        assert_eq!(h.get(), 1);
        assert_eq!(tm.bounds(h), Some(AtlasRect::new(0, 0, 32, 32)));
        assert_eq!(atlas_pixel(&tm, 0, 0), RED);
    }

    #[test]
    fn handles_increase_monotonically() {
        let mut tm = TextureManager::new();
        let ids: Vec<u32> = (0..5)
            .map(|_| tm.upload(&solid(4, 4, RED)).unwrap().get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn failed_upload_does_not_consume_handle() {
        let mut tm = TextureManager::new();
        assert!(tm.upload(&RgbaImage::new(0, 0)).is_err());
        assert_eq!(tm.upload(&solid(1, 1, RED)).unwrap().get(), 1);
    }

    #[test]
    fn upload_is_stored_flipped() {
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, RED);
        img.put_pixel(0, 1, GREEN);

        let mut tm = TextureManager::new();
        let h = tm.upload(&img).unwrap();
        let r = tm.bounds(h).unwrap();
        assert_eq!(atlas_pixel(&tm, r.x, r.y), GREEN);
        assert_eq!(atlas_pixel(&tm, r.x, r.y + 1), RED);
    }

    #[test]
    fn upload_bumps_generation() {
        let mut tm = TextureManager::new();
        let g0 = tm.generation();
        tm.upload(&solid(2, 2, RED)).unwrap();
        assert!(tm.generation() > g0);
    }

    // ── update ────────────────────────────────────────────────────────────

    #[test]
    fn update_writes_in_image_space() {
        let mut tm = TextureManager::new();
        let h = tm.upload(&RgbaImage::new(4, 4)).unwrap();
        // top-left pixel of the image
        tm.update(h, &solid(1, 1, GREEN), 0, 0).unwrap();

        let r = tm.bounds(h).unwrap();
        // stored flipped: image row 0 is the allocation's last row
        assert_eq!(atlas_pixel(&tm, r.x, r.y + 3), GREEN);
        assert_eq!(atlas_pixel(&tm, r.x, r.y), CLEAR);
    }

    #[test]
    fn update_never_leaves_allocation() {
        let mut tm = TextureManager::new();
        let a = tm.upload(&RgbaImage::new(4, 4)).unwrap();
        let b = tm.upload(&solid(4, 4, RED)).unwrap();
        tm.update(a, &solid(8, 8, GREEN), 0, 0).unwrap();

        let rb = tm.bounds(b).unwrap();
        assert_eq!(atlas_pixel(&tm, rb.x, rb.y), RED);
    }

    #[test]
    fn update_unknown_handle_fails() {
        let mut tm = TextureManager::new();
        let bogus = TextureHandle(NonZeroU32::new(42).unwrap());
        assert_eq!(
            tm.update(bogus, &solid(1, 1, RED), 0, 0),
            Err(TextureError::UnknownHandle(bogus))
        );
    }

    // ── resolve ───────────────────────────────────────────────────────────

    #[test]
    fn framebuffer_handles_do_not_collide() {
        let mut tm = TextureManager::new();
        let fb = tm.register_framebuffer(2, 100, 50).unwrap();
        let tex = tm.upload(&solid(2, 2, RED)).unwrap();
        assert!(fb.is_framebuffer());
        assert!(!tex.is_framebuffer());
        assert_ne!(fb, tex);

        let src = tm.resolve(fb).unwrap();
        assert_eq!(src.slot, 2);
        assert_eq!(src.texture_size, (100, 50));
        assert_eq!(src.rows, RowOrder::TopDown);
        assert_eq!(tm.resolve(tex).unwrap().slot, ATLAS_SLOT);
    }

    #[test]
    fn unregistered_framebuffer_no_longer_resolves() {
        let mut tm = TextureManager::new();
        let fb = tm.register_framebuffer(3, 10, 10).unwrap();
        tm.resize_framebuffer(fb, 20, 30);
        assert_eq!(tm.resolve(fb).unwrap().texture_size, (20, 30));
        tm.unregister_framebuffer(fb);
        assert!(tm.resolve(fb).is_none());
    }

    #[test]
    fn framebuffer_handles_are_not_reused_with_their_slot() {
        let mut tm = TextureManager::new();
        let old = tm.register_framebuffer(2, 10, 10).unwrap();
        tm.unregister_framebuffer(old);

        let new = tm.register_framebuffer(2, 300, 200).unwrap();
        assert_ne!(old, new);
        assert!(tm.resolve(old).is_none());
        assert_eq!(tm.resolve(new).unwrap().slot, 2);
        assert_eq!(new.get(), FRAMEBUFFER_HANDLE_BASE + 1);
    }
}
