use std::fmt;

/// Physical keyboard key, named by its US-layout position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Modifiers
    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Any key not listed above. Distinct unmapped keys share this value.
    Unknown,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Platform-independent input, in surface pixels.
///
/// The runtime translates window events into these and queues them; they
/// are applied to [`InputState`](super::InputState) once per loop iteration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    KeyPressed { key: Key, repeat: bool },
    KeyReleased { key: Key },
    MousePressed { button: MouseButton, x: f32, y: f32 },
    MouseReleased { button: MouseButton, x: f32, y: f32 },
    MouseMoved { x: f32, y: f32 },
    /// Wheel movement in lines (pixel deltas are converted at 1 line = 20 px).
    Scrolled { dx: f32, dy: f32 },
    /// New drawable size in physical pixels.
    Resized { width: u32, height: u32 },
    ModifiersChanged(Modifiers),
    Focused(bool),
}
