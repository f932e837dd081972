//! Logger setup for binaries. Library code only goes through `log`.

use std::sync::Once;

/// Used when neither the config nor `RUST_LOG` names a filter. wgpu logs a
/// lot at info level.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// `env_logger` filter, e.g. `"nodal_editor=debug"`. Overrides `RUST_LOG`.
    pub filter: Option<String>,
}

static INIT: Once = Once::new();

/// Installs the `env_logger` backend. Later calls do nothing.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(config.filter.as_deref(), std::env::var("RUST_LOG").ok());
        let installed = env_logger::Builder::new()
            .parse_filters(&filter)
            .format_timestamp_millis()
            .try_init();
        if installed.is_ok() {
            log::debug!("logging with filter `{filter}`");
        }
    });
}

fn resolve_filter(explicit: Option<&str>, env: Option<String>) -> String {
    explicit
        .map(str::to_owned)
        .or(env)
        .unwrap_or_else(|| DEFAULT_FILTER.to_owned())
}
