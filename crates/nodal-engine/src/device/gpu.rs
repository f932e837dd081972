use anyhow::{Context, Result, bail, ensure};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Surface preferences.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swapchain format when the surface offers one.
    pub prefer_srgb: bool,
    /// FIFO paces frames to the display, which is what once-per-frame input
    /// coalescing expects.
    pub present_mode: wgpu::PresentMode,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self { prefer_srgb: true, present_mode: wgpu::PresentMode::Fifo }
    }
}

/// Device, queue and configured surface of one window.
///
/// `'w` ties the surface to the window it presents to.
pub struct Gpu<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

/// An acquired swapchain image and the encoder recording into it.
pub struct Frame {
    texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window).context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no adapter can present to this window")?;
        let info = adapter.get_info();
        log::info!("adapter `{}` on {:?}", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("nodal device"),
                ..Default::default()
            })
            .await
            .context("failed to open device")?;

        let caps = surface.get_capabilities(&adapter);
        let Some(format) = pick_format(&caps.formats, init.prefer_srgb) else {
            bail!("surface reports no formats");
        };
        let alpha_mode = caps.alpha_modes.first().copied().unwrap_or_default();

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: Vec::new(),
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::debug!("surface {format:?} {}x{}", size.width, size.height);

        Ok(Self { surface, device, queue, config })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// A `0x0` size (minimized window) leaves the surface as it is.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquires the next image. `Ok(None)` means skip this frame; the
    /// surface has been reconfigured if it went stale.
    pub fn acquire(&mut self) -> Result<Option<Frame>> {
        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::debug!("surface stale; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(None);
            }
            Err(SurfaceError::OutOfMemory) => bail!("surface out of memory"),
            Err(err) => {
                log::debug!("frame skipped: {err}");
                return Ok(None);
            }
        };

        let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("nodal frame"),
        });
        Ok(Some(Frame { texture, view, encoder }))
    }

    pub fn present(&self, frame: Frame) {
        let Frame { texture, view, encoder } = frame;
        self.queue.submit([encoder.finish()]);
        drop(view);
        texture.present();
    }
}

fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = formats.iter().copied().find(|f| f.is_srgb());
    match srgb {
        Some(f) if prefer_srgb => Some(f),
        _ => formats.first().copied(),
    }
}
