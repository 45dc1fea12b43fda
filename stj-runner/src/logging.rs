//! Tracing setup
//!
//! The subscriber is installed before the config file is read so that
//! warnings from loading it reach stderr. The configured level is applied
//! afterwards through a reload handle, unless `RUST_LOG` is set.

use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter used until the config file has been read
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Handle for swapping the active filter once configuration is known
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

/// Build a reloadable filter layer
///
/// `env_filter` is the `RUST_LOG` filter when one was set; it then takes
/// precedence over any configured level.
pub fn filter_layer(env_filter: Option<EnvFilter>) -> (reload::Layer<EnvFilter, Registry>, LogLevelHandle) {
    let from_env = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let (layer, handle) = reload::Layer::new(filter);

    (layer, LogLevelHandle { handle, from_env })
}

/// Install the global subscriber, writing to stderr
pub fn init() -> LogLevelHandle {
    let (filter, handle) = filter_layer(EnvFilter::try_from_default_env().ok());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    handle
}

impl LogLevelHandle {
    /// Switch to the configured level
    ///
    /// Returns false when `RUST_LOG` is in effect or the reload failed.
    pub fn apply_configured_level(&self, level: &str) -> bool {
        if self.from_env {
            return false;
        }

        match self.handle.reload(EnvFilter::new(level)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, level, "Could not apply configured log level");
                false
            }
        }
    }
}
