//! One wgpu device and surface per window.
//!
//! Failing to create either is fatal: there is no software fallback.

mod gpu;

pub use gpu::{Frame, Gpu, GpuInit};
