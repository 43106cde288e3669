//! # Common Logger
//!
//! Structured error logging with correlation identifiers.
//!
//! ## Design Philosophy
//!
//! 1. **Every error gets an identifier** that appears both in the detailed log
//!    record and in what the caller hands back to the user
//! 2. **Error text conventions are parsed, not trusted**: `code;message` and
//!    `(logsource)` are recognised when present and ignored when absent
//! 3. **Bad input degrades, never fails**: a missing logger or error is a
//!    no-op, a malformed attribute list becomes an empty group plus a notice
//! 4. **The logger is explicit**: records are scoped to the handle the caller
//!    passes, never to a process-wide default
//!
//! ## Quick Start
//!
//! ```rust
//! use common_logger::{log_error, log_info};
//! use tracing::Dispatch;
//!
//! let logger = Dispatch::new(tracing_subscriber::registry());
//!
//! log_info(&logger, "submission-created", &["campaignUUID", "c-42"]);
//!
//! let result = log_error(
//!     Some(&logger),
//!     Some("10000;(collection) MySQL fatal error"),
//!     "errcon HY2000 mysql host not found!",
//!     "AddCampaign.MYSQL_FATAL_ERROR",
//!     &["collectionUUID", "c-7"],
//! )
//! .unwrap();
//!
//! // Safe to hand back to the user; operators grep the logs for the id.
//! let response = result.response_error().unwrap();
//! assert!(response.as_str().ends_with(result.identifier().as_str()));
//! ```
//!
//! ## Record Fields
//!
//! | Field | Coded (`code;message`) | Uncoded |
//! |-------|------------------------|---------|
//! | `args` | attribute group | attribute group |
//! | `error.logsource` | yes | yes |
//! | `error.code` | yes | - |
//! | `error.message` | yes | yes |
//! | `error.detail` | yes | yes |
//! | `error.context` | yes | yes |
//! | `error.identifier` | yes | - |
//!
//! ## Features
//!
//! - `json` (default): JSON output for loggers built with [`LoggerConfig`]

#![warn(clippy::all)]

pub mod attributes;
pub mod config;
pub mod helper;
pub mod identifier;
pub mod logging;
pub mod models;
pub mod parse;
pub mod ring_buffer;

pub use attributes::{AttributeError, Attributes};
pub use config::{ConfigError, LogFormat, LoggerConfig};
pub use helper::{LogHelper, Loggable, log_error_with};
pub use identifier::{CorrelationId, IDENTIFIER_LEN};
pub use logging::{
    ErrorLogger, LOG_ERROR_INVALID_ARGS, LOG_INFO_INVALID_ARGS, LOG_TARGET, log_error,
    log_error_with_attributes, log_info,
};
pub use models::{ErrorResult, ResponseError};
pub use parse::ParsedError;
pub use ring_buffer::{LogEntry, RingBufferLayer};
