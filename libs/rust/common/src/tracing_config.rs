//! Tracing subscriber setup for CLI binaries.
//!
//! Log output always goes to stderr. Stdout is reserved for command output
//! that callers pipe into `eval` or redirect to files.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
    /// Whether to prefix each event with a timestamp
    pub with_time: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_output: false,
            with_time: false,
        }
    }
}

impl TracingConfig {
    /// Set the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Switch to debug level when `verbose` is set.
    #[must_use]
    pub fn verbose(self, verbose: bool) -> Self {
        if verbose {
            self.with_log_level("debug").with_time()
        } else {
            self
        }
    }

    /// Enable JSON output.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    /// Prefix events with timestamps.
    #[must_use]
    pub const fn with_time(mut self) -> Self {
        self.with_time = true;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Initialize tracing with the given configuration.
///
/// Should be called once at startup; later calls are ignored.
pub fn init_tracing(config: &TracingConfig) {
    let registry = tracing_subscriber::registry().with(config.filter());
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match (config.json_output, config.with_time) {
        (true, _) => registry.with(fmt.json()).try_init(),
        (false, true) => registry.with(fmt).try_init(),
        (false, false) => registry.with(fmt.without_time()).try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
