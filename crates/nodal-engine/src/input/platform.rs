//! winit event translation.

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::Window;

use super::state::InputTracker;
use super::types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta,
    PointerButtonEvent, PointerMoveEvent,
};

/// Translates one winit event, updating `tracker` on the way.
///
/// Returns `None` for events apps never see: modifier changes (folded into
/// later events), orphan button releases and everything non-input.
pub(crate) fn translate(
    tracker: &mut InputTracker,
    window: &Window,
    event: &WindowEvent,
) -> Option<InputEvent> {
    let ev = match event {
        WindowEvent::ModifiersChanged(m) => {
            tracker.set_modifiers(modifiers(m.state()));
            return None;
        }
        WindowEvent::Focused(focused) => {
            tracker.focus_changed(*focused);
            InputEvent::Focused(*focused)
        }
        WindowEvent::CursorLeft { .. } => {
            tracker.pointer_left();
            InputEvent::PointerLeft
        }
        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = logical(window, *position);
            tracker.pointer_moved(x, y);
            InputEvent::PointerMoved(PointerMoveEvent { x, y })
        }
        WindowEvent::MouseInput { state, button, .. } => {
            let button = mouse_button(*button);
            let state = match state {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            };
            if !tracker.button(button, state) {
                return None;
            }
            let (x, y) = tracker.pointer();
            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                x,
                y,
                modifiers: tracker.modifiers(),
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match *delta {
                MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x, y },
                MouseScrollDelta::PixelDelta(p) => {
                    let (x, y) = logical(window, p);
                    MouseWheelDelta::Pixel { x, y }
                }
            };
            InputEvent::MouseWheel { delta, modifiers: tracker.modifiers() }
        }
        WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
            key: key(event.physical_key),
            state: match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            },
            modifiers: tracker.modifiers(),
            repeat: event.repeat,
        },
        _ => return None,
    };
    Some(ev)
}

fn logical(window: &Window, p: PhysicalPosition<f64>) -> (f32, f32) {
    let p = p.to_logical::<f32>(window.scale_factor());
    (p.x, p.y)
}

fn modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn mouse_button(b: WinitButton) -> MouseButton {
    match b {
        WinitButton::Left => MouseButton::Left,
        WinitButton::Right => MouseButton::Right,
        WinitButton::Middle => MouseButton::Middle,
        WinitButton::Back => MouseButton::Other(3),
        WinitButton::Forward => MouseButton::Other(4),
        WinitButton::Other(n) => MouseButton::Other(n),
    }
}

fn key(physical: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = physical else {
        return Key::Other(0);
    };
    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Delete => Key::Delete,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Equal => Key::Equal,
        KeyCode::Minus => Key::Minus,
        KeyCode::NumpadAdd => Key::NumpadAdd,
        KeyCode::NumpadSubtract => Key::NumpadSubtract,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyW => Key::W,
        other => Key::Other(other as u32),
    }
}
