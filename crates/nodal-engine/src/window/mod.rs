//! winit event loop hosting one [`crate::core::App`] across its windows.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
