//! Logger construction.
//!
//! The emitters accept any [`Dispatch`]. [`LoggerConfig`] builds the common
//! one: a registry with a level filter, a formatted stdout layer and,
//! optionally, a [`RingBufferLayer`] for recent-record lookups.
//!
//! ```rust
//! use common_logger::{LogFormat, LoggerConfig, log_info};
//! use tracing::level_filters::LevelFilter;
//!
//! let logger = LoggerConfig::new()
//!     .level(LevelFilter::INFO)
//!     .format(LogFormat::Compact)
//!     .build()
//!     .unwrap();
//!
//! log_info(&logger, "service-started", &[]);
//! ```

use crate::ring_buffer::RingBufferLayer;
use std::fmt;
use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Errors raised while building or installing a logger.
#[derive(Debug)]
pub enum ConfigError {
    /// A filter directive (e.g. `RUST_LOG`) did not parse.
    InvalidDirective {
        directive: String,
        reason: String,
    },
    /// A global default logger was already set for this process.
    AlreadyInstalled,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDirective { directive, reason } => {
                write!(f, "invalid filter directive '{}': {}", directive, reason)
            }
            Self::AlreadyInstalled => f.write_str("a global logger is already installed"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Output format of the stdout layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per record.
    #[cfg(feature = "json")]
    Json,
    /// Single-line human readable records.
    Compact,
    /// Multi-line human readable records.
    Pretty,
    /// No stdout output (ring buffer only, or nothing).
    Disabled,
}

impl Default for LogFormat {
    #[cfg(feature = "json")]
    fn default() -> Self {
        Self::Json
    }

    #[cfg(not(feature = "json"))]
    fn default() -> Self {
        Self::Compact
    }
}

#[derive(Debug, Clone)]
enum Filter {
    Level(LevelFilter),
    Directive(String),
}

/// Builder for a logger [`Dispatch`].
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    filter: Filter,
    format: LogFormat,
    with_target: bool,
    ring_buffer: Option<RingBufferLayer>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            filter: Filter::Level(LevelFilter::INFO),
            format: LogFormat::default(),
            with_target: true,
            ring_buffer: None,
        }
    }
}

impl LoggerConfig {
    /// INFO level, default format, target shown, no ring buffer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the filter from `RUST_LOG`, falling back to INFO when unset.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDirective`] when `RUST_LOG` is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_value(std::env::var(EnvFilter::DEFAULT_ENV).ok())
    }

    fn from_env_value(value: Option<String>) -> Result<Self, ConfigError> {
        let config = Self::new();
        match value {
            Some(directive) if !directive.trim().is_empty() => {
                // validate eagerly so a bad variable fails here, not at build()
                parse_directive(&directive)?;
                Ok(config.directive(directive))
            }
            _ => Ok(config),
        }
    }

    #[inline]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.filter = Filter::Level(level);
        self
    }

    /// Use an `EnvFilter` directive such as `"common_logger=debug,warn"`.
    #[inline]
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.filter = Filter::Directive(directive.into());
        self
    }

    #[inline]
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[inline]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Also record into `layer`. Keep a clone of it for queries.
    #[inline]
    pub fn ring_buffer(mut self, layer: RingBufferLayer) -> Self {
        self.ring_buffer = Some(layer);
        self
    }

    /// Build the logger.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDirective`] when the configured directive does
    /// not parse.
    pub fn build(self) -> Result<Dispatch, ConfigError> {
        let filter = match &self.filter {
            Filter::Level(level) => EnvFilter::new(level.to_string()),
            Filter::Directive(directive) => parse_directive(directive)?,
        };

        let output = self.output_layer();
        let subscriber = tracing_subscriber::registry()
            .with(output)
            .with(self.ring_buffer)
            .with(filter);

        Ok(Dispatch::new(subscriber))
    }

    /// Build the logger and make it the process-wide default.
    ///
    /// Only for binaries; libraries should pass the returned handle around
    /// instead.
    ///
    /// # Errors
    ///
    /// Build errors, or [`ConfigError::AlreadyInstalled`].
    pub fn install_global(self) -> Result<Dispatch, ConfigError> {
        let dispatch = self.build()?;
        tracing::dispatcher::set_global_default(dispatch.clone())
            .map_err(|_| ConfigError::AlreadyInstalled)?;
        Ok(dispatch)
    }

    fn output_layer(&self) -> Option<Box<dyn Layer<Registry> + Send + Sync>> {
        let layer = tracing_subscriber::fmt::layer().with_target(self.with_target);
        match self.format {
            #[cfg(feature = "json")]
            LogFormat::Json => Some(layer.json().boxed()),
            LogFormat::Compact => Some(layer.compact().boxed()),
            LogFormat::Pretty => Some(layer.pretty().boxed()),
            LogFormat::Disabled => None,
        }
    }
}

fn parse_directive(directive: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(directive).map_err(|e| ConfigError::InvalidDirective {
        directive: directive.to_owned(),
        reason: e.to_string(),
    })
}
