use crate::input::DEFAULT_EVENT_QUEUE_CAPACITY;
use crate::paint::Color;
use crate::time::DEFAULT_TICK_RATE;

use super::WindowMode;

/// Window and loop settings for [`Engine::run`](crate::window::Engine::run).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window title. With `show_fps` the frame rate is appended to it.
    pub title: String,
    /// Initial drawable width in physical pixels.
    pub width: u32,
    /// Initial drawable height in physical pixels.
    pub height: u32,
    /// Fixed update rate in Hz.
    pub tick_rate: u32,
    /// Whether the user may resize the window.
    pub resizable: bool,
    /// Windowed or borderless fullscreen at startup.
    pub mode: WindowMode,
    /// Appends the measured frame rate to the title once a second.
    pub show_fps: bool,
    /// Events held between two loop iterations before motion and scroll
    /// start to coalesce.
    pub event_queue_capacity: usize,
    /// Color the window is cleared to at the start of every frame.
    pub clear_color: Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "plantain".to_string(),
            width: 800,
            height: 600,
            tick_rate: DEFAULT_TICK_RATE,
            resizable: true,
            mode: WindowMode::Windowed,
            show_fps: false,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            clear_color: Color::BLACK,
        }
    }
}

impl EngineConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }
}
