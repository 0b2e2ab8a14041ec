//! tracing integration for twinlog
//!
//! Routes `tracing` events into a [`twinlog::LogWriter`], so application
//! logs land in the size-bounded two-slot directory and rotate with it.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use twinlog::{LogWriter, SlotConfig};
//! use twinlog_logging::{LogConfig, TwinlogSubscriberBuilder};
//!
//! let log = Arc::new(LogWriter::open(SlotConfig::new("./logs"))?);
//!
//! TwinlogSubscriberBuilder::new(log)
//!     .with_config(LogConfig::production())
//!     .try_init()?;
//!
//! tracing::info!(peer = "A", "connected");
//! ```
//!
//! Events emitted by twinlog itself are kept out of the slots: they are
//! raised while the writer holds its lock, and writing them back into the
//! same log would re-enter it. They still reach the console echo.

pub mod config;
pub mod writer;

pub use config::{ConsoleConfig, LogConfig};
pub use writer::{SlotEventWriter, SlotMakeWriter};

use std::sync::Arc;

use tracing::{Metadata, Subscriber};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::{Layer, Layered, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Registry};
use twinlog::LogWriter;

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Builder for a subscriber that writes into a [`LogWriter`]
pub struct TwinlogSubscriberBuilder {
    log: Arc<LogWriter>,
    config: LogConfig,
}

impl TwinlogSubscriberBuilder {
    /// Create a builder with default configuration
    pub fn new(log: Arc<LogWriter>) -> Self {
        Self {
            log,
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable the console echo
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Write JSON lines instead of plain text
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }

    /// Build the subscriber without installing it
    ///
    /// Useful with `tracing::subscriber::with_default` for scoped logging.
    pub fn build(self) -> impl Subscriber + Send + Sync {
        let filter = self.env_filter();
        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

        layers.push(self.slot_layer());
        if self.config.console.enabled {
            layers.push(self.console_layer());
        }

        Registry::default().with(filter).with(layers)
    }

    /// Install the subscriber globally
    ///
    /// Returns an error if a global subscriber has already been set.
    pub fn try_init(self) -> Result<(), TryInitError> {
        self.build().try_init()
    }

    fn env_filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(&self.config.default_level);
        if self.config.env_override {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
        } else {
            fallback()
        }
    }

    fn slot_layer(&self) -> BoxedLayer {
        let make_writer = SlotMakeWriter::new(Arc::clone(&self.log));
        let keep = filter_fn(|meta: &Metadata<'_>| !is_twinlog_target(meta.target()));

        if self.config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(self.config.include_target)
                .with_file(self.config.include_location)
                .with_line_number(self.config.include_location)
                .with_writer(make_writer)
                .with_filter(keep)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(self.config.include_target)
                .with_file(self.config.include_location)
                .with_line_number(self.config.include_location)
                .with_writer(make_writer)
                .with_filter(keep)
                .boxed()
        }
    }

    fn console_layer(&self) -> BoxedLayer {
        let console = &self.config.console;
        if console.pretty {
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_ansi(console.ansi)
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_ansi(console.ansi)
                .with_target(self.config.include_target)
                .with_writer(std::io::stderr)
                .boxed()
        }
    }
}

fn is_twinlog_target(target: &str) -> bool {
    target == "twinlog" || target.starts_with("twinlog::")
}
