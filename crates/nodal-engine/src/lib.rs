//! Platform layer under the diagram editor: the winit event loop, one wgpu
//! device per window, input translation and the small geometry and color
//! types shared with renderers.

pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod window;
