//! Contract between the runtime and the application it hosts.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
pub(crate) use ctx::logical_viewport;
