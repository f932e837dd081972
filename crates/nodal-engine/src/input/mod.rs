//! Window input in engine terms.
//!
//! Apps only see [`InputEvent`]; winit types stay inside the runtime.

mod state;
mod platform;
mod types;

pub(crate) use state::InputTracker;
pub(crate) use platform::translate;

pub use types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta,
    PointerButtonEvent, PointerMoveEvent,
};
