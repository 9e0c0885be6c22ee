use std::sync::Once;

/// Logger setup for the `env_logger` backend.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter in `env_logger` syntax, e.g. `"plantain_engine=debug,wgpu_core=warn"`.
    /// `RUST_LOG`, when set, is applied after it and wins on conflicts.
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// wgpu and naga log every pipeline and resource at info.
const NOISY_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are no-ops.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(log::LevelFilter::Info);
        for module in NOISY_MODULES {
            builder.filter_module(module, log::LevelFilter::Warn);
        }

        if let Some(filter) = &config.env_filter {
            builder.parse_filters(filter);
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        }
        builder.write_style(config.write_style);

        // Another logger may already be installed by the host application.
        if let Err(err) = builder.try_init() {
            eprintln!("plantain: logger not installed: {err}");
            return;
        }
        log::debug!("logging initialized");
    });
}
