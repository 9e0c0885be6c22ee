use std::collections::HashSet;

use super::types::{InputEvent, Key, Modifiers, MouseButton};

/// Accumulated input for the game window.
///
/// "Down" sets follow press/release events. "Just pressed" sets collect
/// transitions since the last [`InputState::end_frame`], so a press that
/// happens between two rendered frames is visible to every update that runs
/// before the next render.
#[derive(Debug, Default)]
pub struct InputState {
    modifiers: Modifiers,
    focused: bool,
    cursor: (f32, f32),
    scroll: (f32, f32),

    keys_down: HashSet<Key>,
    keys_pressed: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the state.
    ///
    /// Also the way to simulate input: applying `KeyPressed` makes the key
    /// both down and just-pressed until the matching release / `end_frame`.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::KeyPressed { key, repeat } => {
                if self.keys_down.insert(key) && !repeat {
                    self.keys_pressed.insert(key);
                }
            }
            InputEvent::KeyReleased { key } => {
                self.keys_down.remove(&key);
            }
            InputEvent::MousePressed { button, x, y } => {
                self.cursor = (x, y);
                if self.buttons_down.insert(button) {
                    self.buttons_pressed.insert(button);
                }
            }
            InputEvent::MouseReleased { button, x, y } => {
                self.cursor = (x, y);
                self.buttons_down.remove(&button);
            }
            InputEvent::MouseMoved { x, y } => self.cursor = (x, y),
            InputEvent::Scrolled { dx, dy } => {
                self.scroll.0 += dx;
                self.scroll.1 += dy;
            }
            InputEvent::ModifiersChanged(m) => self.modifiers = m,
            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Releases are not delivered to unfocused windows.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }
            InputEvent::Resized { .. } => {}
        }
    }

    /// Clears per-frame data. Called once after each rendered frame.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
        self.scroll = (0.0, 0.0);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn key_just_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn button_just_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    /// Last known cursor position in surface pixels, top-left origin.
    pub fn cursor_position(&self) -> (f32, f32) {
        self.cursor
    }

    /// Wheel movement in lines since the last rendered frame.
    pub fn scroll_delta(&self) -> (f32, f32) {
        self.scroll
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn focused(&self) -> bool {
        self.focused
    }
}
