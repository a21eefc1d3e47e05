//! # Input Manager
//!
//! This module collects window input between frames:
//! - Keyboard state for the keys the showcase reacts to
//! - Mouse buttons, cursor movement and wheel
//!
//! Once per frame the collected state is turned into a `ProcessedInputState`
//! and the per-frame accumulators start over.

use std::collections::HashMap;

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

const KEY_CODES: [KeyCode; 6] = [
    KeyCode::KeyD,
    KeyCode::KeyR,
    KeyCode::KeyT,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Space,
];

const MOUSE_BUTTONS: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

/// Manages the state of all input devices and processes input events.
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    keyboard_inputs_new: HashMap<KeyCode, bool>,

    /// Current state of mouse inputs
    mouse_inputs: MouseInput,

    /// Last cursor position inside the window
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a manager with every tracked key and button released.
    pub fn new() -> Self {
        let keyboard_inputs_old: HashMap<_, _> = KEY_CODES.iter().map(|&key| (key, false)).collect();
        let keyboard_inputs_new = keyboard_inputs_old.clone();

        let mouse_buttons: HashMap<_, _> =
            MOUSE_BUTTONS.iter().map(|&button| (button, false)).collect();
        let mouse_inputs = MouseInput {
            mouse_button_inputs_old: mouse_buttons.clone(),
            mouse_button_inputs_new: mouse_buttons,
            ..MouseInput::default()
        };

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            mouse_inputs,
            last_cursor: None,
        }
    }

    /// Processes a window event and updates internal input state.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => {
                if let Some(key_state) = self.keyboard_inputs_new.get_mut(key) {
                    *key_state = *state == ElementState::Pressed;
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse_inputs.add_scroll(*delta);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button_state) =
                    self.mouse_inputs.mouse_button_inputs_new.get_mut(button)
                {
                    *button_state = *state == ElementState::Pressed;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(last) = self.last_cursor {
                    self.mouse_inputs
                        .add_motion((position.x - last.x, position.y - last.y));
                }
                self.last_cursor = Some(*position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
            }
            _ => {}
        }
    }

    /// Builds the processed state for this frame from the raw states.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let mouse_button_states = self
            .mouse_inputs
            .mouse_button_inputs_new
            .iter()
            .map(|(button, &new_state)| {
                let old_state = self
                    .mouse_inputs
                    .mouse_button_inputs_old
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                (*button, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_delta: self.mouse_inputs.mouse_delta,
            scroll_lines: self.mouse_inputs.mouse_scroll_lines,
        }
    }

    /// Returns this frame's processed input and starts the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.next_frame();
        processed_input
    }

    /// Releases everything, used when the window loses focus so no key or
    /// button stays stuck.
    pub fn reset_inputs(&mut self) {
        self.keyboard_inputs_new.values_mut().for_each(|state| *state = false);
        self.mouse_inputs
            .mouse_button_inputs_new
            .values_mut()
            .for_each(|state| *state = false);
        self.last_cursor = None;
        self.next_frame();
    }

    fn next_frame(&mut self) {
        self.keyboard_inputs_old.clone_from(&self.keyboard_inputs_new);
        self.mouse_inputs
            .mouse_button_inputs_old
            .clone_from(&self.mouse_inputs.mouse_button_inputs_new);
        self.mouse_inputs.mouse_scroll_lines = 0.0;
        self.mouse_inputs.mouse_delta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presses_turn_into_holds_on_the_next_frame() {
        let mut manager = InputManager::new();
        manager.keyboard_inputs_new.insert(KeyCode::KeyD, true);

        let first = manager.get_and_reset_processed_input();
        assert_eq!(first.get_key_state(KeyCode::KeyD), RawInputState::Pressed);

        let second = manager.get_and_reset_processed_input();
        assert_eq!(second.get_key_state(KeyCode::KeyD), RawInputState::Held);
    }

    #[test]
    fn untracked_keys_are_ignored() {
        let manager = InputManager::new();
        let processed = manager.create_processed_input_state();
        assert!(!processed.keyboard_states.contains_key(&KeyCode::KeyW));
        assert_eq!(processed.keyboard_states.len(), KEY_CODES.len());
    }

    #[test]
    fn mouse_accumulators_clear_every_frame() {
        let mut manager = InputManager::new();
        manager.mouse_inputs.add_motion((4.0, 2.0));
        manager.mouse_inputs.mouse_scroll_lines = 2.0;

        let first = manager.get_and_reset_processed_input();
        assert_eq!(first.get_mouse_delta(), Some((4.0, 2.0)));
        assert_eq!(first.get_scroll_lines(), 2.0);

        let second = manager.get_and_reset_processed_input();
        assert_eq!(second.get_mouse_delta(), None);
        assert_eq!(second.get_scroll_lines(), 0.0);
    }

    #[test]
    fn focus_loss_releases_held_buttons() {
        let mut manager = InputManager::new();
        manager
            .mouse_inputs
            .mouse_button_inputs_new
            .insert(MouseButton::Left, true);
        manager.get_and_reset_processed_input();

        manager.reset_inputs();
        let processed = manager.create_processed_input_state();
        assert_eq!(
            processed.get_mouse_button_state(MouseButton::Left),
            RawInputState::NotPressed
        );
    }
}
