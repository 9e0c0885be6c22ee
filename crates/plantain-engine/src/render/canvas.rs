use std::collections::BTreeMap;
use std::ops::Range;

use crate::coords::{Vec2, Viewport};
use crate::paint::Color;
use crate::shapes::Shape;
use crate::text::{Font, FontError, REFERENCE_PX};
use crate::texture::{
    RgbaImage, TextureError, TextureHandle, TextureManager, TextureSource, FIRST_FRAMEBUFFER_SLOT,
    GLYPH_SLOT, MAX_TEXTURE_SLOTS,
};

use super::batch::VertexBatch;
use super::framebuffer::{validate_size, Framebuffer, FramebufferError, FramebufferId};
use super::quad::{clamp_region, quad, EdgeUv};
use super::{OpCode, TextOptions, TextureOptions, Vertex};

/// Vertex cap of a fresh canvas; pass ranges are `u32`.
pub const DEFAULT_VERTEX_LIMIT: usize = u32::MAX as usize;

/// Render target of a recorded pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PassTarget {
    Main,
    Framebuffer(FramebufferId),
}

/// One render pass of a frame: a contiguous vertex range drawn into a target.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    /// Where the pass draws.
    pub target: PassTarget,
    /// Clear color applied before drawing; `None` loads previous content.
    pub clear: Option<Color>,
    /// Range of [`FramePlan::vertices`] drawn by this pass.
    pub vertices: Range<u32>,
}

impl Pass {
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.end - self.vertices.start
    }
}

/// Size and sampler slot of a live framebuffer, as the renderer needs it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TargetDesc {
    /// Framebuffer the target belongs to.
    pub id: FramebufferId,
    /// Sampler slot its color texture is bound to.
    pub slot: u32,
    /// Attachment width in pixels.
    pub width: u32,
    /// Attachment height in pixels.
    pub height: u32,
}

/// Everything the renderer needs to submit one frame.
#[derive(Debug)]
pub struct FramePlan<'a> {
    /// Vertices of every pass, back to back.
    pub vertices: &'a [Vertex],
    /// Passes in submission order.
    pub passes: &'a [Pass],
    /// Every live framebuffer, drawn this frame or not.
    pub framebuffers: Vec<TargetDesc>,
    /// CPU copy of the image atlas and the framebuffer texture table.
    pub textures: &'a TextureManager,
    /// Current font, whose glyph atlas the text passes sample.
    pub font: Option<&'a Font>,
    /// Changes whenever `font` refers to a different font.
    pub font_generation: u64,
}

/// Index of a font loaded into a [`Canvas`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(usize);

#[derive(Debug, Default)]
struct TargetState {
    batch: VertexBatch,
    pending_clear: Option<Color>,
}

impl TargetState {
    fn cleared(color: Color, vertex_limit: usize) -> Self {
        Self {
            batch: VertexBatch::with_max_capacity(vertex_limit),
            pending_clear: Some(color),
        }
    }

    #[inline]
    fn is_dirty(&self) -> bool {
        !self.batch.is_empty() || self.pending_clear.is_some()
    }
}

#[derive(Debug)]
struct FramebufferState {
    slot: u32,
    texture: TextureHandle,
    width: u32,
    height: u32,
    target: TargetState,
}

/// Immediate-mode frame recorder.
///
/// Draw calls are expanded into vertices right away and appended to the batch
/// of the bound target (the window, or the framebuffer on top of the bind
/// stack). A target's batch becomes a [`Pass`] when its content is needed by
/// another target and at the end of the frame, so framebuffer content is
/// always rendered before the quad that samples it.
///
/// The canvas holds no GPU handles; `Renderer::draw` turns the recorded
/// [`FramePlan`] into render passes.
#[derive(Debug)]
pub struct Canvas {
    viewport: Viewport,
    clear_color: Color,
    main: TargetState,
    main_emitted: bool,

    framebuffers: BTreeMap<FramebufferId, FramebufferState>,
    bound: Vec<FramebufferId>,
    next_framebuffer: u32,

    staging: VertexBatch,
    passes: Vec<Pass>,
    vertex_limit: usize,

    textures: TextureManager,

    fonts: Vec<Font>,
    font: Option<FontId>,
    font_generation: u64,
    warned_no_font: bool,
}

impl Canvas {
    pub fn new(viewport: Viewport) -> Self {
        let vertex_limit = DEFAULT_VERTEX_LIMIT;
        Self {
            viewport,
            clear_color: Color::BLACK,
            main: TargetState::cleared(Color::BLACK, vertex_limit),
            main_emitted: false,
            framebuffers: BTreeMap::new(),
            bound: Vec::new(),
            next_framebuffer: 1,
            staging: VertexBatch::with_max_capacity(vertex_limit),
            passes: Vec::new(),
            vertex_limit,
            textures: TextureManager::new(),
            fonts: Vec::new(),
            font: None,
            font_generation: 0,
            warned_no_font: false,
        }
    }

    /// Size of the window surface in pixels.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            log::debug!("canvas viewport {}x{}", viewport.width, viewport.height);
            self.viewport = viewport;
        }
    }

    /// Size of the target draw calls currently land in.
    pub fn target_viewport(&self) -> Viewport {
        match self.bound.last().and_then(|id| self.framebuffers.get(id)) {
            Some(fb) => Viewport::from_size(fb.width, fb.height),
            None => self.viewport,
        }
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Color the window is cleared to at every [`Canvas::begin`].
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    #[inline]
    pub fn vertex_limit(&self) -> usize {
        self.vertex_limit
    }

    /// Caps the vertices a frame may record, across all targets.
    ///
    /// The engine sets this to what the GPU's largest vertex buffer holds.
    /// A draw that would pass the cap is dropped whole; earlier draws stay.
    pub fn set_vertex_limit(&mut self, limit: usize) {
        let limit = limit.min(DEFAULT_VERTEX_LIMIT);
        self.vertex_limit = limit;
        self.staging.set_max_capacity(limit);
        self.main.batch.set_max_capacity(limit);
        for fb in self.framebuffers.values_mut() {
            fb.target.batch.set_max_capacity(limit);
        }
        log::debug!("canvas vertex limit {limit}");
    }

    // ── frame lifecycle ───────────────────────────────────────────────────

    /// Starts a new frame. The window target is cleared to the clear color.
    pub fn begin(&mut self) {
        if !self.bound.is_empty() {
            log::warn!("{} framebuffer(s) left bound across frames", self.bound.len());
            self.bound.clear();
        }
        self.staging.clear();
        self.passes.clear();
        self.main.batch.clear();
        self.main.pending_clear = Some(self.clear_color);
        self.main_emitted = false;
    }

    /// Clears the bound target, discarding what was drawn into it since its
    /// last pass.
    pub fn clear(&mut self, color: Color) {
        let target = self.current_mut();
        target.batch.clear();
        target.pending_clear = Some(color);
    }

    /// Vertices recorded for the bound target and not yet turned into a pass.
    pub fn pending_vertices(&self) -> &[Vertex] {
        match self.bound.last().and_then(|id| self.framebuffers.get(id)) {
            Some(fb) => fb.target.batch.as_slice(),
            None => self.main.batch.as_slice(),
        }
    }

    /// Closes the frame and returns its passes.
    ///
    /// Framebuffers with content that was never drawn anywhere still get
    /// their pass, ahead of the window's final one. The window always gets a
    /// pass, even with no vertices, so the frame is cleared and presented.
    pub fn finish_frame(&mut self) -> FramePlan<'_> {
        if !self.bound.is_empty() {
            log::warn!(
                "{} framebuffer(s) still bound at end of frame; unbinding",
                self.bound.len()
            );
            self.bound.clear();
        }

        let dirty: Vec<FramebufferId> = self
            .framebuffers
            .iter()
            .filter(|(_, fb)| fb.target.is_dirty())
            .map(|(id, _)| *id)
            .collect();
        for id in dirty {
            self.emit(PassTarget::Framebuffer(id));
        }
        if !self.main_emitted || self.main.is_dirty() {
            self.emit(PassTarget::Main);
        }

        FramePlan {
            vertices: self.staging.as_slice(),
            passes: &self.passes,
            framebuffers: self
                .framebuffers
                .iter()
                .map(|(id, fb)| TargetDesc {
                    id: *id,
                    slot: fb.slot,
                    width: fb.width,
                    height: fb.height,
                })
                .collect(),
            textures: &self.textures,
            font: self.current_font(),
            font_generation: self.font_generation,
        }
    }

    // ── shapes ────────────────────────────────────────────────────────────

    /// Draws a shape into the bound target.
    pub fn render(&mut self, shape: impl Into<Shape>) {
        let vertices = shape.into().vertices(self.target_viewport());
        self.push(&vertices);
    }

    // ── text ──────────────────────────────────────────────────────────────

    /// Parses a font and makes it the current one.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontError> {
        let font = Font::load(bytes).inspect_err(|e| log::error!("font load failed: {e}"))?;
        let id = FontId(self.fonts.len());
        log::info!("loaded font {} ({} glyphs)", id.0, font.glyph_count());
        self.fonts.push(font);
        self.font = Some(id);
        self.font_generation += 1;
        Ok(id)
    }

    /// Switches the font used by [`Canvas::render_text`].
    pub fn set_font(&mut self, id: FontId) -> bool {
        if id.0 >= self.fonts.len() {
            log::warn!("set_font: unknown font {}", id.0);
            return false;
        }
        if self.font != Some(id) {
            self.font = Some(id);
            self.font_generation += 1;
        }
        true
    }

    pub fn current_font(&self) -> Option<&Font> {
        self.font.and_then(|FontId(i)| self.fonts.get(i))
    }

    #[inline]
    pub fn font_generation(&self) -> u64 {
        self.font_generation
    }

    /// Lays out `text` with the current font; `options.y` is the baseline.
    pub fn render_text(&mut self, text: &str, options: &TextOptions) {
        let Some(font) = self.current_font() else {
            if !self.warned_no_font {
                log::warn!("render_text: no font loaded");
                self.warned_no_font = true;
            }
            return;
        };
        let vertices = layout_text(font, text, options, self.target_viewport());
        self.push(&vertices);
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[inline]
    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn upload_texture(&mut self, image: &RgbaImage) -> Result<TextureHandle, TextureError> {
        self.textures.upload(image)
    }

    pub fn update_texture(
        &mut self,
        handle: TextureHandle,
        image: &RgbaImage,
        dx: i32,
        dy: i32,
    ) -> Result<(), TextureError> {
        self.textures.update(handle, image, dx, dy)
    }

    /// Draws an uploaded texture (or a framebuffer's texture handle).
    pub fn render_texture(&mut self, handle: TextureHandle, options: &TextureOptions) {
        if handle.is_framebuffer() {
            let owner = self
                .framebuffers
                .iter()
                .find(|(_, fb)| fb.texture == handle)
                .map(|(id, _)| *id);
            match owner {
                Some(id) => self.draw_framebuffer(id, options),
                None => log::warn!("render_texture: unknown framebuffer texture {handle}"),
            }
            return;
        }

        let Some(source) = self.textures.resolve(handle) else {
            log::warn!("render_texture: unknown texture {handle}");
            return;
        };
        let vertices = textured_quad(&source, options, self.target_viewport());
        self.push(&vertices);
    }

    // ── framebuffers ──────────────────────────────────────────────────────

    /// Creates an off-screen target, initially transparent.
    pub fn add_framebuffer(&mut self, width: u32, height: u32) -> Result<Framebuffer, FramebufferError> {
        validate_size(width, height).inspect_err(|e| log::error!("add_framebuffer: {e}"))?;

        let free = (FIRST_FRAMEBUFFER_SLOT..MAX_TEXTURE_SLOTS)
            .find(|slot| self.framebuffers.values().all(|fb| fb.slot != *slot));
        let Some((slot, texture)) =
            free.and_then(|slot| Some((slot, self.textures.register_framebuffer(slot, width, height)?)))
        else {
            log::error!("add_framebuffer: {}", FramebufferError::NoFreeSlot);
            return Err(FramebufferError::NoFreeSlot);
        };

        let id = FramebufferId(self.next_framebuffer);
        self.next_framebuffer += 1;
        self.framebuffers.insert(
            id,
            FramebufferState {
                slot,
                texture,
                width,
                height,
                target: TargetState::cleared(Color::TRANSPARENT, self.vertex_limit),
            },
        );
        log::info!("created framebuffer {id} ({width}x{height}, slot {slot})");

        Ok(Framebuffer { id, slot, texture, width, height })
    }

    /// Redirects draw calls into `fb` until the matching unbind.
    pub fn bind_framebuffer(&mut self, fb: &Framebuffer) -> bool {
        if !self.framebuffers.contains_key(&fb.id) {
            log::warn!("bind_framebuffer: {}", FramebufferError::Unknown(fb.id));
            return false;
        }
        if self.bound.contains(&fb.id) {
            log::warn!("bind_framebuffer: {} is already bound", fb.id);
            return false;
        }
        self.bound.push(fb.id);
        true
    }

    /// Returns to the previously bound target.
    pub fn unbind_framebuffer(&mut self) -> Option<FramebufferId> {
        let popped = self.bound.pop();
        if popped.is_none() {
            log::warn!("unbind_framebuffer: nothing bound");
        }
        popped
    }

    #[inline]
    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.bound.last().copied()
    }

    /// Draws `fb`'s content into the bound target.
    pub fn render_framebuffer(&mut self, fb: &Framebuffer, options: &TextureOptions) {
        self.draw_framebuffer(fb.id, options);
    }

    pub(crate) fn resize_framebuffer(
        &mut self,
        id: FramebufferId,
        width: u32,
        height: u32,
    ) -> Result<(), FramebufferError> {
        validate_size(width, height).inspect_err(|e| log::error!("resize {id}: {e}"))?;
        let Some(fb) = self.framebuffers.get_mut(&id) else {
            return Err(FramebufferError::Unknown(id));
        };

        fb.width = width;
        fb.height = height;
        fb.target = TargetState::cleared(Color::TRANSPARENT, self.vertex_limit);
        self.textures.resize_framebuffer(fb.texture, width, height);
        log::debug!("resized framebuffer {id} to {width}x{height}");
        Ok(())
    }

    pub(crate) fn remove_framebuffer(&mut self, id: FramebufferId) {
        let Some(fb) = self.framebuffers.remove(&id) else { return };
        self.textures.unregister_framebuffer(fb.texture);
        self.bound.retain(|b| *b != id);
        log::info!("destroyed framebuffer {id} (slot {})", fb.slot);
    }

    fn draw_framebuffer(&mut self, id: FramebufferId, options: &TextureOptions) {
        let Some(fb) = self.framebuffers.get(&id) else {
            log::warn!("render_framebuffer: {}", FramebufferError::Unknown(id));
            return;
        };
        if self.bound.contains(&id) {
            log::warn!("render_framebuffer: {id} cannot be drawn while bound");
            return;
        }
        let dirty = fb.target.is_dirty();
        let Some(source) = self.textures.resolve(fb.texture) else { return };

        if dirty {
            // Earlier draws into the parent may sample this framebuffer's
            // previous content, so they go first.
            let parent = self.current_target();
            if self.state(parent).is_some_and(|s| !s.batch.is_empty()) {
                self.emit(parent);
            }
            self.emit(PassTarget::Framebuffer(id));
        }

        let vertices = textured_quad(&source, options, self.target_viewport());
        self.push(&vertices);
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn current_target(&self) -> PassTarget {
        self.bound
            .last()
            .map_or(PassTarget::Main, |id| PassTarget::Framebuffer(*id))
    }

    fn current_mut(&mut self) -> &mut TargetState {
        if let Some(fb) = self.bound.last().and_then(|id| self.framebuffers.get_mut(id)) {
            return &mut fb.target;
        }
        &mut self.main
    }

    fn state(&self, target: PassTarget) -> Option<&TargetState> {
        match target {
            PassTarget::Main => Some(&self.main),
            PassTarget::Framebuffer(id) => self.framebuffers.get(&id).map(|fb| &fb.target),
        }
    }

    fn push(&mut self, vertices: &[Vertex]) {
        if vertices.is_empty() {
            return;
        }
        if self.recorded_vertices() + vertices.len() > self.vertex_limit {
            log::error!(
                "dropping draw of {} vertices: frame limit of {} reached",
                vertices.len(),
                self.vertex_limit
            );
            return;
        }
        if let Err(e) = self.current_mut().batch.extend(vertices) {
            log::error!("dropping draw of {} vertices: {e}", vertices.len());
        }
    }

    /// Vertices recorded this frame, emitted or still pending.
    fn recorded_vertices(&self) -> usize {
        self.staging.len()
            + self.main.batch.len()
            + self.framebuffers.values().map(|fb| fb.target.batch.len()).sum::<usize>()
    }

    /// Moves a target's batch into the frame's staging buffer as one pass.
    fn emit(&mut self, target: PassTarget) {
        let state = match target {
            PassTarget::Main => &mut self.main,
            PassTarget::Framebuffer(id) => match self.framebuffers.get_mut(&id) {
                Some(fb) => &mut fb.target,
                None => return,
            },
        };

        let start = self.staging.len() as u32;
        if let Err(e) = self.staging.extend(state.batch.as_slice()) {
            log::error!("dropping {} vertices of a {target:?} pass: {e}", state.batch.len());
        }
        let end = self.staging.len() as u32;

        self.passes.push(Pass {
            target,
            clear: state.pending_clear.take(),
            vertices: start..end,
        });
        state.batch.clear();

        if target == PassTarget::Main {
            self.main_emitted = true;
        }
    }
}

fn layout_text(font: &Font, text: &str, options: &TextOptions, viewport: Viewport) -> Vec<Vertex> {
    if !viewport.is_valid() {
        return Vec::new();
    }

    let scale = options.size / REFERENCE_PX;
    let template = Vertex {
        font_index: GLYPH_SLOT,
        ..Vertex::base(OpCode::Text, options.color.to_array(), viewport.resolution())
    };

    let mut out = Vec::with_capacity(text.len() * 6);
    let mut pen_x = options.x;
    let mut baseline = options.y;
    let mut prev: Option<char> = None;

    for ch in text.chars() {
        if ch == '\n' {
            pen_x = options.x;
            baseline += font.line_height() * scale;
            prev = None;
            continue;
        }
        let Some(glyph) = font.glyph(ch) else {
            log::debug!("no cached glyph for {ch:?}");
            continue;
        };

        if let Some(p) = prev {
            pen_x += font.kerning(p, ch, REFERENCE_PX).unwrap_or(0.0) * scale;
        }
        if !glyph.is_blank() {
            let origin = Vec2::new(pen_x + glyph.bearing_x * scale, baseline - glyph.bearing_y * scale);
            let size = Vec2::new(glyph.width * scale, glyph.height * scale);
            out.extend(quad(viewport, origin, size, 0.0, EdgeUv::from_rect(glyph.tex_coords), template));
        }
        pen_x += glyph.advance * scale;
        prev = Some(ch);
    }
    out
}

fn textured_quad(source: &TextureSource, o: &TextureOptions, viewport: Viewport) -> Vec<Vertex> {
    if !viewport.is_valid() {
        return Vec::new();
    }
    let Some(region) = clamp_region(source, o.rect_x, o.rect_y, o.rect_width, o.rect_height) else {
        log::debug!("texture region ({}, {}) is outside the texture", o.rect_x, o.rect_y);
        return Vec::new();
    };

    let width = if o.desired_width != 0.0 { o.desired_width } else { region.width as f32 * o.scale };
    let height = if o.desired_height != 0.0 { o.desired_height } else { region.height as f32 * o.scale };
    let uv = EdgeUv::for_source(source, region).flipped(o.flip_x, o.flip_y);
    let template = Vertex {
        texture_index: source.slot,
        ..Vertex::base(OpCode::Texture, Color::WHITE.to_array(), viewport.resolution())
    };

    quad(viewport, Vec2::new(o.x, o.y), Vec2::new(width, height), o.rotation, uv, template).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Polygon, Rect};
    use crate::texture::{Rgba, ATLAS_SLOT};
    use approx::assert_abs_diff_eq;

    const FONT: &[u8] = include_bytes!("../../tests/fixtures/DejaVuSansMono.ttf");

    fn canvas() -> Canvas {
        let mut c = Canvas::new(Viewport::new(800.0, 600.0));
        c.begin();
        c
    }

    fn canvas_with_font() -> Canvas {
        let mut c = canvas();
        c.load_font(FONT).unwrap();
        c
    }

    fn square() -> Rect {
        Rect::new(10.0, 10.0, 20.0, 20.0, Color::RED)
    }

    fn px(v: &Vertex) -> [f32; 2] {
        let [x, y] = v.fs_quad_pos;
        crate::coords::from_ndc(x, y, 800.0, 600.0)
    }

    fn targets(plan: &FramePlan<'_>) -> Vec<PassTarget> {
        plan.passes.iter().map(|p| p.target).collect()
    }

    // ── shapes ────────────────────────────────────────────────────────────

    #[test]
    fn render_appends_to_main() {
        let mut c = canvas();
        c.render(square());
        c.render(Circle::new(Vec2::new(50.0, 50.0), 5.0, Color::BLUE));
        assert_eq!(c.pending_vertices().len(), 12);
    }

    #[test]
    fn shape_color_reaches_vertices_unconverted() {
        let mut c = canvas();
        let color = Color::from_rgba8(128, 64, 32, 255);
        c.render(Rect::new(0.0, 0.0, 4.0, 4.0, color));
        for v in c.pending_vertices() {
            assert_eq!(v.color, [128.0 / 255.0, 64.0 / 255.0, 32.0 / 255.0, 1.0]);
        }
    }

    #[test]
    fn degenerate_shape_is_a_no_op() {
        let mut c = canvas();
        c.render(Polygon::new(vec![]));
        assert!(c.pending_vertices().is_empty());
    }

    // ── frame plan ────────────────────────────────────────────────────────

    #[test]
    fn empty_frame_has_one_empty_main_pass() {
        let mut c = canvas();
        let plan = c.finish_frame();

        assert_eq!(plan.passes.len(), 1);
        let pass = &plan.passes[0];
        assert_eq!(pass.target, PassTarget::Main);
        assert_eq!(pass.vertex_count(), 0);
        assert_eq!(pass.clear, Some(Color::BLACK));
        assert!(plan.vertices.is_empty());
    }

    #[test]
    fn main_pass_carries_all_vertices() {
        let mut c = canvas();
        c.set_clear_color(Color::BLUE);
        c.begin();
        c.render(square());
        c.render(square());

        let plan = c.finish_frame();
        assert_eq!(plan.passes.len(), 1);
        assert_eq!(plan.passes[0].vertices, 0..12);
        assert_eq!(plan.passes[0].clear, Some(Color::BLUE));
        assert_eq!(plan.vertices.len(), 12);
    }

    #[test]
    fn clear_discards_pending_geometry() {
        let mut c = canvas();
        c.render(square());
        c.clear(Color::GREEN);

        let plan = c.finish_frame();
        assert_eq!(plan.passes[0].vertex_count(), 0);
        assert_eq!(plan.passes[0].clear, Some(Color::GREEN));
    }

    #[test]
    fn begin_resets_the_frame() {
        let mut c = canvas();
        c.render(square());
        let _ = c.finish_frame();

        c.begin();
        let plan = c.finish_frame();
        assert_eq!(plan.passes.len(), 1);
        assert!(plan.vertices.is_empty());
    }

    // ── vertex limit ──────────────────────────────────────────────────────

    #[test]
    fn draws_past_the_vertex_limit_are_dropped_whole() {
        let mut c = canvas();
        c.set_vertex_limit(15);
        c.render(square());
        c.render(Rect::new(40.0, 40.0, 5.0, 5.0, Color::GREEN));
        c.render(Rect::new(80.0, 80.0, 5.0, 5.0, Color::BLUE));

        let plan = c.finish_frame();
        assert_eq!(plan.vertices.len(), 12);
        assert_eq!(plan.vertices[0].color, Color::RED.to_array());
        assert_eq!(plan.vertices[11].color, Color::GREEN.to_array());
    }

    #[test]
    fn vertex_limit_spans_every_target() {
        let mut c = canvas();
        c.set_vertex_limit(12);
        let fb = c.add_framebuffer(16, 16).unwrap();

        c.bind_framebuffer(&fb);
        c.render(square());
        c.unbind_framebuffer();
        c.render(square());
        c.render(square());

        let plan = c.finish_frame();
        assert_eq!(plan.vertices.len(), 12);
        assert_eq!(targets(&plan), vec![PassTarget::Framebuffer(fb.id()), PassTarget::Main]);
        assert_eq!(plan.passes[1].vertex_count(), 6);
    }

    #[test]
    fn next_frame_starts_with_the_full_budget() {
        let mut c = canvas();
        c.set_vertex_limit(6);
        c.render(square());
        c.render(square());
        let _ = c.finish_frame();

        c.begin();
        c.render(square());
        assert_eq!(c.pending_vertices().len(), 6);
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn single_glyph_emits_one_text_quad() {
        let mut c = canvas_with_font();
        c.render_text("A", &TextOptions::new(10.0, 10.0, 12.0));

        let glyph = *c.current_font().unwrap().glyph('A').unwrap();
        let [u0, v0, u1, v1] = glyph.tex_coords;
        let verts = c.pending_vertices();

        assert_eq!(verts.len(), 6);
        for v in verts {
            assert_eq!(v.op(), Some(OpCode::Text));
            assert_eq!(v.font_index, GLYPH_SLOT);
            assert!(v.tex_coord[0] == u0 || v.tex_coord[0] == u1);
            assert!(v.tex_coord[1] == v0 || v.tex_coord[1] == v1);
        }
        // Top-left corner samples the glyph's top-left.
        assert_eq!(verts[0].tex_coord, [u0, v0]);
        assert_eq!(verts[2].tex_coord, [u1, v1]);
    }

    #[test]
    fn glyph_sits_on_the_baseline() {
        let mut c = canvas_with_font();
        c.render_text("A", &TextOptions::new(100.0, 300.0, REFERENCE_PX));

        let glyph = *c.current_font().unwrap().glyph('A').unwrap();
        let bottom = px(&c.pending_vertices()[1]);
        assert_abs_diff_eq!(bottom[1], 300.0 - glyph.bearing_y + glyph.height, epsilon = 1e-3);
    }

    #[test]
    fn unknown_runes_emit_nothing_and_do_not_advance() {
        let mut c = canvas_with_font();
        c.render_text("é中", &TextOptions::new(0.0, 50.0, 16.0));
        assert!(c.pending_vertices().is_empty());

        c.render_text("AB", &TextOptions::new(0.0, 50.0, 16.0));
        let plain = c.pending_vertices().to_vec();
        c.clear(Color::BLACK);
        c.render_text("AéB", &TextOptions::new(0.0, 50.0, 16.0));
        assert_eq!(c.pending_vertices(), plain.as_slice());
    }

    #[test]
    fn space_advances_the_pen() {
        let mut c = canvas_with_font();
        c.render_text("A A", &TextOptions::new(0.0, 100.0, REFERENCE_PX));

        let advance = c.current_font().unwrap().glyph('A').unwrap().advance;
        let verts = c.pending_vertices();
        let first = px(&verts[0]);
        let last = px(&verts[verts.len() - 6]);
        assert_abs_diff_eq!(last[0] - first[0], advance * 2.0, epsilon = 1e-3);
    }

    #[test]
    fn newline_returns_to_start_and_moves_down() {
        let mut c = canvas_with_font();
        let opts = TextOptions::new(40.0, 100.0, 32.0);
        c.render_text("A\nA", &opts);

        let verts = c.pending_vertices();
        assert_eq!(verts.len(), 12);
        let first = px(&verts[0]);
        let second = px(&verts[6]);
        let line = c.current_font().unwrap().line_height();

        assert_abs_diff_eq!(first[0], second[0], epsilon = 1e-3);
        assert_abs_diff_eq!(second[1] - first[1], line, epsilon = 1e-3);
    }

    #[test]
    fn text_without_font_is_skipped() {
        let mut c = canvas();
        c.render_text("hello", &TextOptions::default());
        assert!(c.pending_vertices().is_empty());
    }

    #[test]
    fn font_switches_bump_generation() {
        let mut c = canvas();
        assert!(c.load_font(b"not a font").is_err());
        assert_eq!(c.font_generation(), 0);

        let first = c.load_font(FONT).unwrap();
        let _second = c.load_font(FONT).unwrap();
        assert_eq!(c.font_generation(), 2);

        assert!(c.set_font(first));
        assert_eq!(c.font_generation(), 3);
        assert!(c.set_font(first));
        assert_eq!(c.font_generation(), 3);
        assert!(!c.set_font(FontId(9)));
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn uploaded_texture_renders_white_textured_quad() {
        let mut c = canvas();
        let handle = c.upload_texture(&RgbaImage::from_pixel(32, 32, Rgba([255, 0, 0, 255]))).unwrap();
        assert_eq!(handle.get(), 1);

        c.render_texture(handle, &TextureOptions::at(5.0, 5.0));
        let verts = c.pending_vertices();
        assert_eq!(verts.len(), 6);
        for v in verts {
            assert_eq!(v.op(), Some(OpCode::Texture));
            assert_eq!(v.texture_index, ATLAS_SLOT);
            assert_eq!(v.color, [1.0; 4]);
        }
        assert_eq!(verts[0].width, 32.0);
    }

    #[test]
    fn desired_size_overrides_scale() {
        let mut c = canvas();
        let handle = c.upload_texture(&RgbaImage::new(8, 4)).unwrap();

        let scaled = TextureOptions { scale: 2.0, ..TextureOptions::default() };
        c.render_texture(handle, &scaled);
        assert_eq!((c.pending_vertices()[0].width, c.pending_vertices()[0].height), (16.0, 8.0));

        c.clear(Color::BLACK);
        c.render_texture(handle, &TextureOptions::default().sized(100.0, 50.0));
        assert_eq!((c.pending_vertices()[0].width, c.pending_vertices()[0].height), (100.0, 50.0));
    }

    #[test]
    fn unknown_texture_draws_nothing() {
        let mut c = canvas();
        let mut other = canvas();
        let handle = other.upload_texture(&RgbaImage::new(4, 4)).unwrap();

        c.render_texture(handle, &TextureOptions::default());
        assert!(c.pending_vertices().is_empty());
    }

    // ── framebuffers ──────────────────────────────────────────────────────

    #[test]
    fn resized_framebuffer_reports_new_size_and_binds() {
        let mut c = canvas();
        let mut fb = c.add_framebuffer(100, 100).unwrap();
        fb.resize(&mut c, 50, 200).unwrap();

        assert_eq!((fb.width(), fb.height()), (50, 200));
        assert!(c.bind_framebuffer(&fb));
        assert_eq!(c.target_viewport(), Viewport::new(50.0, 200.0));

        c.render(square());
        assert_eq!(c.pending_vertices()[0].resolution, [50.0, 200.0]);
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        let mut c = canvas();
        assert!(matches!(c.add_framebuffer(0, 10), Err(FramebufferError::InvalidSize { .. })));

        let mut fb = c.add_framebuffer(10, 10).unwrap();
        assert!(fb.resize(&mut c, 10, 0).is_err());
        assert_eq!((fb.width(), fb.height()), (10, 10));
    }

    #[test]
    fn slots_run_out_and_come_back() {
        let mut c = canvas();
        let mut fbs: Vec<Framebuffer> = (0..14).map(|_| c.add_framebuffer(4, 4).unwrap()).collect();
        assert_eq!(fbs[0].slot(), FIRST_FRAMEBUFFER_SLOT);
        assert_eq!(fbs[13].slot(), MAX_TEXTURE_SLOTS - 1);
        assert_eq!(c.add_framebuffer(4, 4).unwrap_err(), FramebufferError::NoFreeSlot);

        let freed = fbs.remove(3);
        let slot = freed.slot();
        freed.destroy(&mut c);
        assert_eq!(c.add_framebuffer(4, 4).unwrap().slot(), slot);
    }

    #[test]
    fn framebuffer_pass_precedes_its_use() {
        let mut c = canvas();
        let fb = c.add_framebuffer(64, 64).unwrap();

        c.bind_framebuffer(&fb);
        c.render(square());
        fb.draw(&mut c, 0.0, 0.0, 128.0, 128.0);
        assert_eq!(c.bound_framebuffer(), None);

        let plan = c.finish_frame();
        assert_eq!(targets(&plan), vec![PassTarget::Framebuffer(fb.id()), PassTarget::Main]);
        assert_eq!(plan.passes[0].clear, Some(Color::TRANSPARENT));
        assert_eq!(plan.passes[0].vertices, 0..6);
        assert_eq!(plan.passes[1].vertices, 6..12);

        let blit = &plan.vertices[6];
        assert_eq!(blit.op(), Some(OpCode::Texture));
        assert_eq!(blit.texture_index, fb.slot());
        assert_eq!((blit.width, blit.height), (128.0, 128.0));
    }

    #[test]
    fn earlier_main_content_is_kept_in_order() {
        let mut c = canvas();
        let fb = c.add_framebuffer(64, 64).unwrap();

        c.render(square());
        c.bind_framebuffer(&fb);
        c.render(square());
        fb.draw(&mut c, 0.0, 0.0, 64.0, 64.0);

        let plan = c.finish_frame();
        assert_eq!(
            targets(&plan),
            vec![PassTarget::Main, PassTarget::Framebuffer(fb.id()), PassTarget::Main]
        );
        assert_eq!(plan.passes[0].clear, Some(Color::BLACK));
        assert_eq!(plan.passes[2].clear, None);
        assert_eq!(plan.passes[2].vertex_count(), 6);
    }

    #[test]
    fn framebuffer_content_persists_between_frames() {
        let mut c = canvas();
        let fb = c.add_framebuffer(32, 32).unwrap();
        c.bind_framebuffer(&fb);
        c.render(square());
        c.unbind_framebuffer();
        let _ = c.finish_frame();

        c.begin();
        fb.draw(&mut c, 0.0, 0.0, 32.0, 32.0);
        let plan = c.finish_frame();

        assert_eq!(targets(&plan), vec![PassTarget::Main]);
        assert_eq!(plan.passes[0].vertex_count(), 6);
    }

    #[test]
    fn clear_while_bound_targets_the_framebuffer() {
        let mut c = canvas();
        let fb = c.add_framebuffer(32, 32).unwrap();
        let _ = c.finish_frame();

        c.begin();
        c.bind_framebuffer(&fb);
        c.render(square());
        c.clear(Color::RED);
        c.unbind_framebuffer();

        let plan = c.finish_frame();
        let fb_pass = plan
            .passes
            .iter()
            .find(|p| p.target == PassTarget::Framebuffer(fb.id()))
            .unwrap();
        assert_eq!(fb_pass.clear, Some(Color::RED));
        assert_eq!(fb_pass.vertex_count(), 0);
    }

    #[test]
    fn drawing_into_itself_is_refused() {
        let mut c = canvas();
        let a = c.add_framebuffer(32, 32).unwrap();
        let b = c.add_framebuffer(32, 32).unwrap();

        c.bind_framebuffer(&a);
        c.bind_framebuffer(&b);
        c.render_framebuffer(&a, &TextureOptions::default());
        assert!(c.pending_vertices().is_empty());
        assert!(!c.bind_framebuffer(&a));
    }

    #[test]
    fn nested_framebuffers_flush_inner_first() {
        let mut c = canvas();
        let outer = c.add_framebuffer(64, 64).unwrap();
        let inner = c.add_framebuffer(16, 16).unwrap();

        c.bind_framebuffer(&outer);
        c.bind_framebuffer(&inner);
        c.render(square());
        inner.draw(&mut c, 0.0, 0.0, 16.0, 16.0);
        outer.draw(&mut c, 0.0, 0.0, 64.0, 64.0);

        let plan = c.finish_frame();
        assert_eq!(
            targets(&plan),
            vec![
                PassTarget::Framebuffer(inner.id()),
                PassTarget::Framebuffer(outer.id()),
                PassTarget::Main,
            ]
        );
        assert_eq!(plan.vertices[6].texture_index, inner.slot());
        assert_eq!(plan.vertices[12].texture_index, outer.slot());
    }

    #[test]
    fn framebuffer_texture_handle_draws_like_the_framebuffer() {
        let mut c = canvas();
        let fb = c.add_framebuffer(20, 10).unwrap();
        assert!(fb.texture_handle().is_framebuffer());

        c.render_texture(fb.texture_handle(), &TextureOptions::default());
        let plan = c.finish_frame();
        assert_eq!(plan.passes[0].target, PassTarget::Framebuffer(fb.id()));
        assert_eq!(plan.vertices[0].width, 20.0);
    }

    #[test]
    fn undrawn_framebuffers_still_get_a_pass() {
        let mut c = canvas();
        let fb = c.add_framebuffer(8, 8).unwrap();
        c.bind_framebuffer(&fb);
        c.render(square());

        let plan = c.finish_frame();
        assert_eq!(targets(&plan), vec![PassTarget::Framebuffer(fb.id()), PassTarget::Main]);
        assert_eq!(plan.framebuffers.len(), 1);
    }

    #[test]
    fn stale_framebuffer_handle_does_not_reach_a_new_framebuffer() {
        let mut c = canvas();
        let old = c.add_framebuffer(10, 10).unwrap();
        let stale = old.texture_handle();
        old.destroy(&mut c);

        let new = c.add_framebuffer(300, 200).unwrap();
        assert_ne!(new.texture_handle(), stale);
        c.render_texture(stale, &TextureOptions::default());
        assert!(c.pending_vertices().is_empty());

        c.render_texture(new.texture_handle(), &TextureOptions::default());
        assert_eq!(c.pending_vertices()[0].width, 300.0);
    }

    #[test]
    fn destroyed_framebuffer_leaves_the_plan() {
        let mut c = canvas();
        let fb = c.add_framebuffer(8, 8).unwrap();
        let handle = fb.texture_handle();
        c.bind_framebuffer(&fb);
        fb.destroy(&mut c);

        assert_eq!(c.bound_framebuffer(), None);
        assert!(c.textures().resolve(handle).is_none());
        let plan = c.finish_frame();
        assert!(plan.framebuffers.is_empty());
        assert_eq!(targets(&plan), vec![PassTarget::Main]);
    }
}
