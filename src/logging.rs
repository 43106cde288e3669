//! Info and error emission.
//!
//! Both entry points take the logger explicitly and scope every record to it
//! with [`tracing::dispatcher::with_default`]. No process-wide default is set,
//! so concurrent callers using different loggers never interfere.
//!
//! # Record shape
//!
//! Info records:
//!
//! ```text
//! INFO  message=<context>  args={"k":"v",...}
//! ```
//!
//! Error records, coded (`code;message`):
//!
//! ```text
//! ERROR message=<error text>  args={...}
//!       error.logsource error.code error.message error.detail
//!       error.context error.identifier
//! ```
//!
//! Error records, uncoded (dependency errors) carry the same fields minus
//! `error.code` and `error.identifier`. The identifier is still returned in
//! the [`ErrorResult`].

use crate::attributes::Attributes;
use crate::helper::Loggable;
use crate::identifier::CorrelationId;
use crate::models::{ErrorResult, ResponseError};
use crate::parse::{self, ParsedError};
use std::fmt;
use tracing::{Dispatch, dispatcher};

/// Target attached to every record this crate emits.
pub const LOG_TARGET: &str = "common_logger";

/// Context of the notice emitted when `log_info` receives an odd pair list.
pub const LOG_INFO_INVALID_ARGS: &str = "logInfo.InvalidArgs";

/// Context of the notice emitted when `log_error` receives an odd pair list.
pub const LOG_ERROR_INVALID_ARGS: &str = "logError.InvalidArgs";

const INVALID_ARGS_NOTICE: [&str; 2] = ["args", "null"];

/// Emit one INFO record with `context` as its message.
///
/// `pairs` is a flat `key, value, ...` list. An odd-length list is not
/// logged; a single `logInfo.InvalidArgs` notice is emitted instead.
///
/// ```rust
/// use common_logger::log_info;
/// use tracing::Dispatch;
///
/// let logger = Dispatch::new(tracing_subscriber::registry());
/// log_info(&logger, "submission-created", &["campaignUUID", "c-1", "creatorUUID", "u-9"]);
/// ```
pub fn log_info(logger: &Dispatch, context: &str, pairs: &[&str]) {
    match Attributes::from_pairs(pairs) {
        Ok(attributes) => emit_info(logger, context, &attributes),
        Err(_) => log_info(logger, LOG_INFO_INVALID_ARGS, &INVALID_ARGS_NOTICE),
    }
}

/// Log an error and return its normalized result.
///
/// Returns `None` without side effects when either `logger` or
/// `source_error` is absent. Otherwise exactly one ERROR record is emitted
/// (preceded by a `logError.InvalidArgs` notice when `pairs` has odd
/// length, in which case the record's attribute group is empty).
///
/// ```rust
/// use common_logger::log_error;
/// use tracing::Dispatch;
///
/// let logger = Dispatch::new(tracing_subscriber::registry());
/// let result = log_error(
///     Some(&logger),
///     Some("10000;(collection) MySQL fatal error"),
///     "errcon HY2000 mysql host not found!",
///     "AddCampaign.MYSQL_FATAL_ERROR",
///     &["collectionUUID", "c-1"],
/// )
/// .unwrap();
///
/// assert_eq!(result.identifier().len(), 10);
/// assert!(result.response_error().is_some());
/// ```
pub fn log_error<E: fmt::Display>(
    logger: Option<&Dispatch>,
    source_error: Option<E>,
    detail: &str,
    context: &str,
    pairs: &[&str],
) -> Option<ErrorResult<E>> {
    let logger = logger?;
    let source_error = source_error?;

    let attributes = group_or_notice(logger, pairs);
    Some(normalize(logger, source_error, detail, context, &attributes))
}

/// Like [`log_error`], with an already grouped attribute set.
pub fn log_error_with_attributes<E: fmt::Display>(
    logger: Option<&Dispatch>,
    source_error: Option<E>,
    detail: &str,
    context: &str,
    attributes: &Attributes,
) -> Option<ErrorResult<E>> {
    let logger = logger?;
    let source_error = source_error?;
    Some(normalize(logger, source_error, detail, context, attributes))
}

/// Odd pair lists degrade to an empty group after an INFO notice.
fn group_or_notice(logger: &Dispatch, pairs: &[&str]) -> Attributes {
    Attributes::from_pairs(pairs).unwrap_or_else(|_| {
        log_info(logger, LOG_ERROR_INVALID_ARGS, &INVALID_ARGS_NOTICE);
        Attributes::new()
    })
}

pub(crate) fn normalize<E: fmt::Display>(
    logger: &Dispatch,
    source_error: E,
    detail: &str,
    context: &str,
    attributes: &Attributes,
) -> ErrorResult<E> {
    let identifier = CorrelationId::new();
    let text = source_error.to_string();
    let parsed = parse::parse_error_text(&text);

    emit_error(logger, &text, &parsed, detail, context, &identifier, attributes);

    let response_error = parsed
        .is_coded()
        .then(|| ResponseError::new(&text, &identifier));

    ErrorResult::new(identifier, context, source_error, response_error)
}

fn emit_info(logger: &Dispatch, context: &str, attributes: &Attributes) {
    dispatcher::with_default(logger, || {
        tracing::info!(target: LOG_TARGET, args = %attributes, "{}", context);
    });
}

fn emit_error(
    logger: &Dispatch,
    text: &str,
    parsed: &ParsedError<'_>,
    detail: &str,
    context: &str,
    identifier: &CorrelationId,
    attributes: &Attributes,
) {
    dispatcher::with_default(logger, || match parsed.code {
        Some(code) => tracing::error!(
            target: LOG_TARGET,
            args = %attributes,
            error.logsource = parsed.logsource,
            error.code = code,
            error.message = parsed.message,
            error.detail = detail,
            error.context = context,
            error.identifier = %identifier,
            "{}",
            text
        ),
        // dependency error: no code, identifier stays out of the record
        None => tracing::error!(
            target: LOG_TARGET,
            args = %attributes,
            error.logsource = parsed.logsource,
            error.message = parsed.message,
            error.detail = detail,
            error.context = context,
            "{}",
            text
        ),
    });
}

/// Owned logger handle with method-style access to the emitters.
///
/// Cloning is cheap; the underlying [`Dispatch`] is reference counted.
#[derive(Debug, Clone)]
pub struct ErrorLogger {
    dispatch: Dispatch,
}

impl ErrorLogger {
    #[inline]
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    #[inline]
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// See [`log_info`].
    #[inline]
    pub fn info(&self, context: &str, pairs: &[&str]) {
        log_info(&self.dispatch, context, pairs);
    }

    /// See [`log_error`]. The logger is always present here, so a result is
    /// always produced.
    pub fn error<E: fmt::Display>(
        &self,
        source_error: E,
        detail: &str,
        context: &str,
        pairs: &[&str],
    ) -> ErrorResult<E> {
        let attributes = group_or_notice(&self.dispatch, pairs);
        normalize(&self.dispatch, source_error, detail, context, &attributes)
    }

    /// Log an error with the attributes declared by `payload`.
    pub fn error_with<P, E>(
        &self,
        source_error: E,
        detail: &str,
        context: &str,
        payload: &P,
    ) -> ErrorResult<E>
    where
        P: Loggable + ?Sized,
        E: fmt::Display,
    {
        normalize(&self.dispatch, source_error, detail, context, &payload.attributes())
    }
}

impl From<Dispatch> for ErrorLogger {
    fn from(dispatch: Dispatch) -> Self {
        Self::new(dispatch)
    }
}
