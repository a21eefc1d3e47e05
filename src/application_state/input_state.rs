//! # Input State
//!
//! Per-frame snapshots of keyboard and mouse input, as handed to the engine.

use std::collections::HashMap;
use winit::{
    event::{MouseButton, MouseScrollDelta},
    keyboard::KeyCode,
};

/// Pixels of touchpad scrolling that count as one wheel line
const PIXELS_PER_LINE: f64 = 40.0;

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Derives the state from the previous and current raw states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of the processed input states with state transitions.
#[derive(Debug, Default)]
pub struct ProcessedInputState {
    /// Current state of all tracked keyboard keys
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Current state of mouse buttons
    pub mouse_button_states: HashMap<MouseButton, RawInputState>,

    /// Mouse movement delta since the last frame (x, y)
    pub mouse_delta: Option<(f64, f64)>,

    /// Wheel movement since the last frame, in lines, positive away from the user
    pub scroll_lines: f32,
}

impl ProcessedInputState {
    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Gets the state of a mouse button
    pub fn get_mouse_button_state(&self, button: MouseButton) -> RawInputState {
        self.mouse_button_states.get(&button).copied().unwrap_or_default()
    }

    /// Gets the mouse movement delta since the last frame
    pub fn get_mouse_delta(&self) -> Option<(f64, f64)> {
        self.mouse_delta
    }

    /// Gets the wheel movement since the last frame
    pub fn get_scroll_lines(&self) -> f32 {
        self.scroll_lines
    }
}

/// Tracks the state of mouse inputs including buttons, scroll, and movement.
#[derive(Debug, Default)]
pub struct MouseInput {
    /// Previous state of each mouse button (pressed/released)
    pub mouse_button_inputs_old: HashMap<MouseButton, bool>,
    /// Current state of each mouse button (pressed/released)
    pub mouse_button_inputs_new: HashMap<MouseButton, bool>,

    /// Accumulated wheel movement since the last frame, in lines
    pub mouse_scroll_lines: f32,

    /// Accumulated mouse movement since the last frame (x, y)
    pub mouse_delta: Option<(f64, f64)>,
}

impl MouseInput {
    /// Adds one wheel event to the accumulated scroll.
    pub fn add_scroll(&mut self, delta: MouseScrollDelta) {
        self.mouse_scroll_lines += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
        };
    }

    /// Adds one motion event to the accumulated movement.
    pub fn add_motion(&mut self, (dx, dy): (f64, f64)) {
        let (x, y) = self.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_delta = Some((x + dx, y + dy));
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;

    use super::*;

    #[test]
    fn transitions_follow_the_raw_states() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert!(RawInputState::Held.is_active());
        assert!(!RawInputState::Held.is_just_pressed());
    }

    #[test]
    fn scroll_and_motion_accumulate() {
        let mut mouse = MouseInput::default();
        mouse.add_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        mouse.add_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 80.0)));
        mouse.add_motion((3.0, -1.0));
        mouse.add_motion((2.0, 4.0));

        assert_eq!(mouse.mouse_scroll_lines, 3.0);
        assert_eq!(mouse.mouse_delta, Some((5.0, 3.0)));
    }

    #[test]
    fn untracked_inputs_read_as_not_pressed() {
        let input = ProcessedInputState::default();
        assert_eq!(input.get_key_state(KeyCode::KeyQ), RawInputState::NotPressed);
        assert_eq!(input.get_scroll_lines(), 0.0);
    }
}
