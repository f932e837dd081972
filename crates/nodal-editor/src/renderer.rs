//! Push-based scene rendering.
//!
//! [`RedrawTracker`] turns state cell emissions into a dirty flag; the host
//! only asks the runtime for a frame while it is set. [`SceneRenderer`] draws
//! a registry into an already cleared target.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use nodal_engine::render::{RenderCtx, RenderTarget};

use crate::cell::SubscriptionSet;
use crate::program::NodeProgram;
use crate::registry::Registry;
use crate::state::EditorState;

/// Dirty flag fed by every state cell that affects the picture.
pub struct RedrawTracker {
    dirty: Rc<Cell<bool>>,
    subscriptions: SubscriptionSet,
}

impl RedrawTracker {
    /// Starts dirty so the first frame is always drawn.
    pub fn new<T: 'static>(state: &EditorState<T>) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let mut subscriptions = SubscriptionSet::new();

        let d = dirty.clone();
        subscriptions.push(state.canvas_size().subscribe(move |_| d.set(true)));
        let d = dirty.clone();
        subscriptions.push(state.nodes().subscribe(move |_| d.set(true)));
        let d = dirty.clone();
        subscriptions.push(state.pan_offset().subscribe(move |_| d.set(true)));
        let d = dirty.clone();
        subscriptions.push(state.zoom_step().subscribe(move |_| d.set(true)));
        let d = dirty.clone();
        subscriptions.push(state.selection().subscribe(move |_| d.set(true)));

        Self { dirty, subscriptions }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    /// Consumes the flag for one repaint.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    pub fn dispose(&mut self) {
        self.subscriptions.unsubscribe_all();
    }
}

/// Draws node fans with one shared [`NodeProgram`].
pub struct SceneRenderer {
    program: NodeProgram,
    format: wgpu::TextureFormat,
}

impl SceneRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, segments: u32) -> Result<Self> {
        let program =
            NodeProgram::new(device, format, segments).context("failed to build node program")?;
        Ok(Self { program, format })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn program(&self) -> &NodeProgram {
        &self.program
    }

    /// Uploads stale buffers, then draws every object in draw order.
    pub fn render(
        &self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        registry: &mut Registry,
    ) {
        self.program.write_resolution(ctx.queue, ctx.viewport);
        registry.prepare(ctx.device, ctx.queue, &self.program);

        if registry.is_empty() {
            return;
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("nodal node pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        self.program.bind(&mut rpass);
        registry.draw(&mut rpass, &self.program);
    }
}
