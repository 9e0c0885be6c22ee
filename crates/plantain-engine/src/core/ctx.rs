use std::time::Duration;

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::window::{Fullscreen, Window};

use crate::input::InputState;
use crate::render::Canvas;
use crate::time::FrameTime;

/// How the game window occupies the screen.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum WindowMode {
    #[default]
    Windowed,
    /// Covers the current monitor without changing its video mode.
    BorderlessFullscreen,
}

impl WindowMode {
    pub(crate) fn to_fullscreen(self) -> Option<Fullscreen> {
        match self {
            WindowMode::Windowed => None,
            WindowMode::BorderlessFullscreen => Some(Fullscreen::Borderless(None)),
        }
    }

    fn from_fullscreen(fullscreen: Option<&Fullscreen>) -> Self {
        match fullscreen {
            None => WindowMode::Windowed,
            Some(_) => WindowMode::BorderlessFullscreen,
        }
    }
}

/// Handle to the game window.
pub struct WindowCtx<'a> {
    window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    pub(crate) fn new(window: &'a Window) -> Self {
        Self { window }
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    /// Requests a new drawable size. The change arrives later as
    /// `InputEvent::Resized`; platforms may refuse or adjust it.
    pub fn set_size(&self, width: u32, height: u32) {
        if let Some(actual) = self.window.request_inner_size(PhysicalSize::new(width, height)) {
            log::debug!("window resized immediately to {}x{}", actual.width, actual.height);
        }
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    pub fn mode(&self) -> WindowMode {
        WindowMode::from_fullscreen(self.window.fullscreen().as_ref())
    }

    /// Switches between a decorated window and borderless fullscreen on the
    /// current monitor. The new size arrives as `InputEvent::Resized`.
    pub fn set_mode(&self, mode: WindowMode) {
        if self.mode() == mode {
            return;
        }
        log::info!("window mode -> {mode:?}");
        self.window.set_fullscreen(mode.to_fullscreen());
    }

    /// Shows or hides the title bar and borders.
    pub fn set_decorations(&self, decorations: bool) {
        self.window.set_decorations(decorations);
    }

    /// Allows or forbids resizing by the user.
    pub fn set_resizable(&self, resizable: bool) {
        self.window.set_resizable(resizable);
    }

    /// Top-left corner of the window frame on the desktop, in physical
    /// pixels. `None` where the platform does not expose it.
    pub fn position(&self) -> Option<(i32, i32)> {
        self.window.outer_position().ok().map(|p| (p.x, p.y))
    }

    /// Moves the window frame. Ignored on platforms without window
    /// positioning.
    pub fn set_position(&self, x: i32, y: i32) {
        self.window.set_outer_position(PhysicalPosition::new(x, y));
    }
}

/// Context for one fixed update.
pub struct UpdateCtx<'a> {
    pub input: &'a InputState,
    /// Fixed step length.
    pub dt: Duration,
    /// Number of updates run before this one.
    pub tick: u64,
    exit: &'a mut bool,
}

impl<'a> UpdateCtx<'a> {
    pub(crate) fn new(input: &'a InputState, dt: Duration, tick: u64, exit: &'a mut bool) -> Self {
        Self { input, dt, tick, exit }
    }

    #[inline]
    pub fn dt_secs(&self) -> f32 {
        self.dt.as_secs_f32()
    }

    /// Ends the loop after the current iteration.
    pub fn exit(&mut self) {
        *self.exit = true;
    }
}

/// Context for one rendered frame.
pub struct FrameCtx<'a> {
    pub canvas: &'a mut Canvas,
    pub input: &'a InputState,
    pub window: WindowCtx<'a>,
    pub time: FrameTime,
    /// Fraction of a fixed step not yet simulated, for interpolation.
    pub alpha: f32,
    exit: &'a mut bool,
}

impl<'a> FrameCtx<'a> {
    pub(crate) fn new(
        canvas: &'a mut Canvas,
        input: &'a InputState,
        window: WindowCtx<'a>,
        time: FrameTime,
        alpha: f32,
        exit: &'a mut bool,
    ) -> Self {
        Self { canvas, input, window, time, alpha, exit }
    }

    /// Ends the loop after this frame is presented.
    pub fn exit(&mut self) {
        *self.exit = true;
    }
}
