use anyhow::Result;
use winit::window::WindowId;

use crate::coords::Viewport;
use crate::input::InputEvent;

use super::ctx::FrameCtx;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Per-window callbacks implemented by the hosted application.
///
/// Frames are on demand: after each batch of events the runtime asks
/// [`App::needs_redraw`] for every window and only requests a redraw for
/// those that answer `true`.
pub trait App {
    /// A window and its device are ready.
    fn on_window_created(&mut self, window_id: WindowId, size: Viewport);

    /// The window is about to go away with its device.
    fn on_window_closed(&mut self, window_id: WindowId);

    /// Logical drawable size changed.
    fn on_resize(&mut self, window_id: WindowId, size: Viewport) {
        let _ = (window_id, size);
    }

    /// One translated event, in arrival order.
    fn on_input(&mut self, window_id: WindowId, event: &InputEvent) -> AppControl;

    fn needs_redraw(&self, window_id: WindowId) -> bool;

    /// Renders one frame. An error stops the runtime and is returned from
    /// [`crate::window::Runtime::run`].
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;
}
