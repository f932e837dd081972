/// Keys the studio binds. Anything else is `Other` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Equal,
    Minus,
    NumpadAdd,
    NumpadSubtract,
    A,
    C,
    N,
    W,
    Other(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Wheel motion; positive `y` means the wheel rolled away from the user.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    /// Notched wheels, in lines.
    Line { x: f32, y: f32 },
    /// Trackpads, in logical pixels.
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    pub fn vertical(self) -> f32 {
        match self {
            Self::Line { y, .. } | Self::Pixel { y, .. } => y,
        }
    }
}

/// Pointer position in logical pixels from the surface origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Button change at the last known pointer position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        repeat: bool,
    },
    PointerMoved(PointerMoveEvent),
    PointerButton(PointerButtonEvent),
    MouseWheel {
        delta: MouseWheelDelta,
        modifiers: Modifiers,
    },
    /// Pointer left the surface.
    PointerLeft,
    Focused(bool),
}
