//! Logging initialization and configuration.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when neither `RUST_LOG` nor the config file supplies one.
pub const DEFAULT_FILTER: &str = "info,vkframe=debug";

/// Initialize the logging system with tracing.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` is used. Passing
/// `None` falls back to [`DEFAULT_FILTER`]. Calling this twice is harmless,
/// the second registration is ignored.
///
/// # Example
/// ```
/// vkframe_core::init_logging(None);
/// tracing::info!("Engine starting");
/// ```
pub fn init_logging(default_filter: Option<&str>) {
    let fallback = default_filter.unwrap_or(DEFAULT_FILTER);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
