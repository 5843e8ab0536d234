use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "orrery_ui=debug,wgpu=warn") and wins over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Hold wgpu's internal crates at `warn` when no filter is given.
    pub quiet_gpu: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            quiet_gpu: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self { env_filter: Some(filter.into()), ..Self::default() }
    }
}

const GPU_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

fn builder(config: &LoggingConfig, rust_log: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    match config.env_filter.as_deref().or(rust_log) {
        Some(filter) => {
            builder.parse_filters(filter);
        }
        None => {
            builder.filter_level(LevelFilter::Info);
            if config.quiet_gpu {
                for module in GPU_MODULES {
                    builder.filter_module(module, LevelFilter::Warn);
                }
            }
        }
    }

    builder.write_style(config.write_style);
    builder
}

static INIT: Once = Once::new();

/// Installs the `env_logger` backend once; later calls are ignored, as is
/// a logger the host installed first.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        if builder(&config, rust_log.as_deref()).try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(config: &LoggingConfig, rust_log: Option<&str>) -> LevelFilter {
        builder(config, rust_log).build().filter()
    }

    #[test]
    fn explicit_filter_beats_rust_log() {
        let config = LoggingConfig::with_filter("debug");
        assert_eq!(level(&config, Some("error")), LevelFilter::Debug);
    }

    #[test]
    fn rust_log_applies_without_filter() {
        assert_eq!(level(&LoggingConfig::default(), Some("trace")), LevelFilter::Trace);
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(level(&LoggingConfig::default(), None), LevelFilter::Info);
    }
}
