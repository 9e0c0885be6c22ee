use crate::render::Canvas;

use super::ctx::{FrameCtx, UpdateCtx};

/// Callbacks driven by the engine loop.
///
/// `update` runs at the fixed tick rate, zero or more times per loop
/// iteration. `render` runs once after any iteration that ran at least one
/// update; everything it draws into the canvas is presented that frame.
pub trait Game {
    /// Called once the window and GPU exist, before the first update.
    /// Load fonts, upload textures and create framebuffers here.
    fn init(&mut self, canvas: &mut Canvas) -> anyhow::Result<()> {
        let _ = canvas;
        Ok(())
    }

    fn update(&mut self, ctx: &mut UpdateCtx<'_>);

    fn render(&mut self, ctx: &mut FrameCtx<'_>);
}
