//! Per-frame handles passed to renderers.
//!
//! Renderers own their pipelines and buffers. Geometry is in logical pixels;
//! shaders map it to NDC through a resolution uniform.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
