mod labels;
mod studio;

use anyhow::Result;
use nodal_engine::device::GpuInit;
use nodal_engine::logging::{init_logging, LoggingConfig};
use nodal_engine::window::{Runtime, RuntimeConfig};

use studio::Studio;

fn main() -> Result<()> {
    init_logging(&LoggingConfig::default());
    log::info!("keys: +/- zoom, A add node, C clear, W new editor window, Esc quit");

    Runtime::run(
        RuntimeConfig { title: Studio::window_title(1), ..RuntimeConfig::default() },
        GpuInit::default(),
        Studio::new(),
    )
}
