//! GPU program shared by every node fan, plus the per-node buffers bound to it.

use anyhow::{bail, ensure, Context, Result};
use bytemuck::{Pod, Zeroable};
use nodal_engine::coords::Viewport;
use nodal_engine::paint::Color;
use wgpu::util::DeviceExt;

use crate::config::{MAX_CIRCLE_SEGMENTS, MIN_CIRCLE_SEGMENTS};
use crate::geometry::{fan_indices, FanVertex};

// ── GPU types ─────────────────────────────────────────────────────────────

/// `u_resolution`: logical surface size, padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ResolutionUniform {
    size: [f32; 2],
    _pad: [f32; 2],
}

/// `u_color`: premultiplied RGBA.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ColorUniform {
    rgba: [f32; 4],
}

fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

fn uniform_layout_entry<U>(visibility: wgpu::ShaderStages) -> Result<wgpu::BindGroupLayoutEntry> {
    let size = std::num::NonZeroU64::new(std::mem::size_of::<U>() as u64)
        .context("uniform type has zero size")?;
    Ok(wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: Some(size),
        },
        count: None,
    })
}

// ── program ───────────────────────────────────────────────────────────────

/// Compiled pipeline with the `a_position`, `u_resolution` and `u_color` slots,
/// the resolution uniform and the shared fan index buffer.
pub struct NodeProgram {
    pipeline: wgpu::RenderPipeline,
    color_layout: wgpu::BindGroupLayout,

    resolution_ubo: wgpu::Buffer,
    resolution_bind_group: wgpu::BindGroup,

    index_buffer: wgpu::Buffer,
    index_count: u32,
    segments: u32,
}

impl NodeProgram {
    /// Builds the program for `format` and fans of `segments` slices.
    ///
    /// Any shader compilation error is returned; there is no fallback program.
    /// So is a segment count outside `MIN_CIRCLE_SEGMENTS..=MAX_CIRCLE_SEGMENTS`.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, segments: u32) -> Result<Self> {
        ensure!(
            (MIN_CIRCLE_SEGMENTS..=MAX_CIRCLE_SEGMENTS).contains(&segments),
            "{segments} circle segments outside {MIN_CIRCLE_SEGMENTS}..={MAX_CIRCLE_SEGMENTS}"
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("nodal node shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/node.wgsl").into()),
        });

        let info = pollster::block_on(shader.get_compilation_info());
        let errors: Vec<String> = info
            .messages
            .iter()
            .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
            .map(|m| m.message.clone())
            .collect();
        if !errors.is_empty() {
            bail!("node shader failed to compile: {}", errors.join("; "));
        }

        let resolution_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nodal u_resolution bgl"),
            entries: &[uniform_layout_entry::<ResolutionUniform>(wgpu::ShaderStages::VERTEX)?],
        });
        let color_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nodal u_color bgl"),
            entries: &[uniform_layout_entry::<ColorUniform>(wgpu::ShaderStages::FRAGMENT)?],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nodal node pipeline layout"),
            bind_group_layouts: &[&resolution_layout, &color_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("nodal node pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[FanVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let resolution_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("nodal u_resolution ubo"),
            size: std::mem::size_of::<ResolutionUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let resolution_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nodal u_resolution bind group"),
            layout: &resolution_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: resolution_ubo.as_entire_binding(),
            }],
        });

        let indices = fan_indices(segments);
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nodal fan ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!("node program built for {format:?}, {segments} segments");

        Ok(Self {
            pipeline,
            color_layout,
            resolution_ubo,
            resolution_bind_group,
            index_buffer,
            index_count: indices.len() as u32,
            segments,
        })
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn write_resolution(&self, queue: &wgpu::Queue, viewport: Viewport) {
        queue.write_buffer(
            &self.resolution_ubo,
            0,
            bytemuck::bytes_of(&ResolutionUniform {
                size: [viewport.width.max(1.0), viewport.height.max(1.0)],
                _pad: [0.0; 2],
            }),
        );
    }

    /// Binds pipeline, resolution and index buffer for the fans that follow.
    pub fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.resolution_bind_group, &[]);
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    }
}

// ── per-node buffers ──────────────────────────────────────────────────────

struct Fan {
    vbo: wgpu::Buffer,
    color_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Fan {
    fn new(
        device: &wgpu::Device,
        program: &NodeProgram,
        label: &str,
        vertices: &[FanVertex],
        color: Color,
    ) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let color_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&ColorUniform { rgba: color.to_array() }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &program.color_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: color_ubo.as_entire_binding(),
            }],
        });
        Self { vbo, color_ubo, bind_group }
    }

    fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, index_count: u32) {
        rpass.set_bind_group(1, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.draw_indexed(0..index_count, 0, 0..1);
    }

    fn destroy(&self) {
        self.vbo.destroy();
        self.color_ubo.destroy();
    }
}

/// Vertex and color buffers of one node: the border fan and the fill fan.
pub struct NodeBuffers {
    border: Fan,
    fill: Fan,
}

impl NodeBuffers {
    pub fn new(
        device: &wgpu::Device,
        program: &NodeProgram,
        border_vertices: &[FanVertex],
        fill_vertices: &[FanVertex],
        border_color: Color,
        fill_color: Color,
    ) -> Self {
        Self {
            border: Fan::new(device, program, "nodal node border", border_vertices, border_color),
            fill: Fan::new(device, program, "nodal node fill", fill_vertices, fill_color),
        }
    }

    /// Replaces both vertex buffers. Fan sizes are fixed per program, so the
    /// existing allocations always fit.
    pub fn write_geometry(&self, queue: &wgpu::Queue, border: &[FanVertex], fill: &[FanVertex]) {
        queue.write_buffer(&self.border.vbo, 0, bytemuck::cast_slice(border));
        queue.write_buffer(&self.fill.vbo, 0, bytemuck::cast_slice(fill));
    }

    pub fn write_colors(&self, queue: &wgpu::Queue, border: Color, fill: Color) {
        queue.write_buffer(
            &self.border.color_ubo,
            0,
            bytemuck::bytes_of(&ColorUniform { rgba: border.to_array() }),
        );
        queue.write_buffer(
            &self.fill.color_ubo,
            0,
            bytemuck::bytes_of(&ColorUniform { rgba: fill.to_array() }),
        );
    }

    /// Border first so the fill covers its inner part.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, index_count: u32) {
        self.border.draw(rpass, index_count);
        self.fill.draw(rpass, index_count);
    }

    pub fn destroy(&self) {
        self.border.destroy();
        self.fill.destroy();
    }
}
