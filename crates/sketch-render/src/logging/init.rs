use std::sync::Once;

use log::LevelFilter;

/// Target of every record this crate emits.
const RENDER_TARGET: &str = "sketch_render";

/// How a sketch driver wants renderer diagnostics reported.
///
/// `RUST_LOG`, when set, replaces the computed filter entirely.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for everything outside `sketch_render`.
    pub level: LevelFilter,
    /// Raise `sketch_render` to `debug`: one line per frame with upload and
    /// draw counts, plus one per shape upload.
    pub frame_stats: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            frame_stats: false,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_frame_stats(mut self, on: bool) -> Self {
        self.frame_stats = on;
        self
    }

    /// `env_logger` filter string for this config, or `rust_log` verbatim.
    pub fn filter_directives(&self, rust_log: Option<&str>) -> String {
        if let Some(spec) = rust_log.filter(|s| !s.trim().is_empty()) {
            return spec.to_string();
        }
        let base = self.level.to_string().to_lowercase();
        if self.frame_stats && self.level < LevelFilter::Debug {
            format!("{base},{RENDER_TARGET}=debug")
        } else {
            base
        }
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` for a sketch driver.
///
/// Only the first call in a process does anything. If the host sketch runtime
/// already set a global logger, that logger keeps receiving renderer records
/// and this config is dropped.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let filters = config.filter_directives(rust_log.as_deref());

        let installed = env_logger::Builder::new()
            .parse_filters(&filters)
            .write_style(config.write_style)
            .try_init()
            .is_ok();

        if installed {
            log::debug!(target: RENDER_TARGET, "logger installed with filter '{filters}'");
        }
    });
}
