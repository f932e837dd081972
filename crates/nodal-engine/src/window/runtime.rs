use std::collections::HashMap;

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, logical_viewport};
use crate::device::{Gpu, GpuInit};
use crate::input::{InputTracker, translate};

/// How a new window opens.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { title: "nodal".to_owned(), initial_size: LogicalSize::new(1280.0, 720.0) }
    }
}

/// Requests an app makes during a frame; applied once the frame returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    open: Vec<RuntimeConfig>,
}

impl RuntimeCtx {
    pub fn create_window(&mut self, config: RuntimeConfig) {
        self.open.push(config);
    }
}

pub struct Runtime;

impl Runtime {
    /// Runs until the last window closes or the app asks to exit.
    ///
    /// Fails if a window or its device cannot be created, or if the app
    /// returns an error from a frame.
    pub fn run<A: App + 'static>(first: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let mut host = Host {
            first: Some(first),
            gpu_init,
            app,
            windows: HashMap::new(),
            error: None,
        };
        event_loop.run_app(&mut host).context("event loop failed")?;
        host.error.map_or(Ok(()), Err)
    }
}

#[self_referencing]
struct WindowSlot {
    input: InputTracker,
    window: Window,
    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct Host<A> {
    /// Opened on the first `resumed`.
    first: Option<RuntimeConfig>,
    gpu_init: GpuInit,
    app: A,
    windows: HashMap<WindowId, WindowSlot>,
    /// First fatal error; ends the loop.
    error: Option<anyhow::Error>,
}

impl<A: App> Host<A> {
    fn open(&mut self, event_loop: &ActiveEventLoop, config: RuntimeConfig) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(config.title)
            .with_inner_size(config.initial_size);
        let window = event_loop.create_window(attrs).context("failed to create window")?;
        let id = window.id();
        let gpu_init = self.gpu_init.clone();

        let slot = WindowSlotTryBuilder {
            input: InputTracker::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .with_context(|| format!("failed to set up GPU for window {id:?}"))?;

        let size = slot.with_window(|w| logical_viewport(w));
        slot.with_window(|w| w.request_redraw());
        self.windows.insert(id, slot);
        log::debug!("window {id:?} opened at {}x{}", size.width, size.height);
        self.app.on_window_created(id, size);
        Ok(())
    }

    fn close(&mut self, id: WindowId) {
        if self.windows.contains_key(&id) {
            self.app.on_window_closed(id);
            self.windows.remove(&id);
            log::debug!("window {id:?} closed");
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn resize(&mut self, id: WindowId) {
        let Some(slot) = self.windows.get_mut(&id) else {
            return;
        };
        let physical = slot.with_window(|w| w.inner_size());
        slot.with_gpu_mut(|gpu| gpu.resize(physical));
        let size = slot.with_window(|w| logical_viewport(w));
        slot.with_window(|w| w.request_redraw());
        self.app.on_resize(id, size);
    }

    fn input(&mut self, id: WindowId, event: &WindowEvent) -> AppControl {
        let Some(slot) = self.windows.get_mut(&id) else {
            return AppControl::Continue;
        };
        let translated = slot.with_mut(|s| translate(s.input, s.window, event));
        match translated {
            Some(ev) => self.app.on_input(id, &ev),
            None => AppControl::Continue,
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop, id: WindowId) {
        let Some(slot) = self.windows.get_mut(&id) else {
            return;
        };
        let app = &mut self.app;
        let mut runtime = RuntimeCtx::default();
        let result = slot.with_mut(|s| {
            app.on_frame(&mut FrameCtx {
                window_id: id,
                window: s.window,
                gpu: s.gpu,
                runtime: &mut runtime,
            })
        });

        match result {
            Ok(AppControl::Continue) => {}
            Ok(AppControl::Exit) => event_loop.exit(),
            Err(err) => return self.fail(event_loop, err),
        }
        for config in runtime.open {
            if let Err(err) = self.open(event_loop, config) {
                return self.fail(event_loop, err);
            }
        }
    }
}

impl<A: App> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(config) = self.first.take() {
            if let Err(err) = self.open(event_loop, config) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.close(id);
                if self.windows.is_empty() {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => self.resize(id),
            WindowEvent::RedrawRequested => self.frame(event_loop, id),
            ref other => {
                if self.input(id, other) == AppControl::Exit {
                    event_loop.exit();
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        for (id, slot) in &self.windows {
            if self.app.needs_redraw(*id) {
                slot.with_window(|w| w.request_redraw());
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let ids: Vec<WindowId> = self.windows.keys().copied().collect();
        for id in ids {
            self.close(id);
        }
    }
}
