//! Circle fan tessellation.
//!
//! A fan of `segments` slices has `segments + 2` vertices: the center, then
//! `segments + 1` perimeter points where the last repeats the first so the
//! loop closes. wgpu has no fan topology, so fans are drawn as a triangle
//! list through [`fan_indices`].

use bytemuck::{Pod, Zeroable};
use nodal_engine::coords::Vec2;

use crate::config::{MAX_CIRCLE_SEGMENTS, MIN_CIRCLE_SEGMENTS};

/// Vertex layout of node fans (8 bytes), `a_position` at location 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FanVertex {
    pub position: [f32; 2],
}

impl FanVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FanVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

impl From<Vec2> for FanVertex {
    fn from(v: Vec2) -> Self {
        Self { position: v.to_array() }
    }
}

pub fn fan_vertex_count(segments: u32) -> usize {
    segments as usize + 2
}

/// Screen-space fan around `center`. Perimeter point `i` sits at angle
/// `i * 2π / segments`.
pub fn circle_fan(center: Vec2, radius: f32, segments: u32) -> Vec<FanVertex> {
    let step = std::f32::consts::TAU / segments as f32;
    let mut out = Vec::with_capacity(fan_vertex_count(segments));
    out.push(FanVertex::from(center));
    out.extend((0..=segments).map(|i| {
        FanVertex::from(center + Vec2::from_angle(i as f32 * step) * radius)
    }));
    out
}

/// Triangle-list indices `[0, i, i + 1]` for `i` in `1..=segments`.
///
/// Panics if `segments` is outside
/// `MIN_CIRCLE_SEGMENTS..=MAX_CIRCLE_SEGMENTS`.
pub fn fan_indices(segments: u32) -> Vec<u16> {
    assert!(
        (MIN_CIRCLE_SEGMENTS..=MAX_CIRCLE_SEGMENTS).contains(&segments),
        "{segments} segments do not fit u16 fan indices"
    );
    (1..=segments as u16).flat_map(|i| [0, i, i + 1]).collect()
}
