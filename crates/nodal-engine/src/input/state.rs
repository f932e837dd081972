use std::collections::HashSet;

use super::types::{Modifiers, MouseButton, MouseButtonState};

/// What one window has seen of the pointer and modifier keys.
///
/// winit reports button presses and wheel steps without a position or
/// modifiers; translation fills them in from here.
#[derive(Debug, Default)]
pub(crate) struct InputTracker {
    modifiers: Modifiers,
    pointer: Option<(f32, f32)>,
    pressed: HashSet<MouseButton>,
}

impl InputTracker {
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Last pointer position, or the origin if the pointer never entered.
    pub fn pointer(&self) -> (f32, f32) {
        self.pointer.unwrap_or_default()
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// Losing focus forgets held buttons; their releases go elsewhere.
    pub fn focus_changed(&mut self, focused: bool) {
        if !focused {
            self.pressed.clear();
        }
    }

    /// Records a button change. Returns `false` for a release whose press
    /// this window never saw.
    pub fn button(&mut self, button: MouseButton, state: MouseButtonState) -> bool {
        match state {
            MouseButtonState::Pressed => {
                self.pressed.insert(button);
                true
            }
            MouseButtonState::Released => self.pressed.remove(&button),
        }
    }
}
