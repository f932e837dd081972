use anyhow::Result;
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::device::Gpu;
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::window::RuntimeCtx;

/// Logical inner size of `window`.
pub(crate) fn logical_viewport(window: &Window) -> Viewport {
    let size = window.inner_size().to_logical::<f32>(window.scale_factor());
    Viewport::new(size.width, size.height)
}

/// Handed to [`crate::core::App::on_frame`] for one window.
pub struct FrameCtx<'a, 'w> {
    pub window_id: WindowId,
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    pub fn viewport(&self) -> Viewport {
        logical_viewport(self.window)
    }

    /// Clears the surface to `clear`, lets `draw` record into it and presents.
    ///
    /// Nothing is drawn for a minimized window or a skipped frame. Errors are
    /// fatal surface failures.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> Result<()>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let viewport = self.viewport();
        if !viewport.is_valid() {
            return Ok(());
        }
        let Some(mut frame) = self.gpu.acquire()? else {
            return Ok(());
        };

        let ctx = RenderCtx {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            surface_format: self.gpu.surface_format(),
            viewport,
        };
        let mut target = RenderTarget { encoder: &mut frame.encoder, color_view: &frame.view };
        target.clear(clear);
        draw(&ctx, &mut target);

        self.window.pre_present_notify();
        self.gpu.present(frame);
        Ok(())
    }
}
