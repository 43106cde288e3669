//! Payload-aware logging helpers.
//!
//! Domain code often wants to log an error together with "the thing being
//! processed" (a submission, an order, ...). Two seams support that:
//!
//! - [`Loggable`]: a payload type declares which attributes describe it.
//! - [`LogHelper`]: a callback with the same shape as [`log_error`] that takes
//!   a typed payload. Any matching function or closure is a `LogHelper`, so
//!   storage layers can accept one and stay ignorant of the payload type.
//!
//! ```rust
//! use common_logger::{Attributes, ErrorResult, LogHelper, Loggable, log_error_with};
//! use tracing::Dispatch;
//!
//! struct Submission { uuid: String, caption: String }
//!
//! impl Loggable for Submission {
//!     fn attributes(&self) -> Attributes {
//!         Attributes::new()
//!             .with("uuid", self.uuid.as_str())
//!             .with("caption", self.caption.as_str())
//!     }
//! }
//!
//! fn set_redis<H>(submission: &Submission, helper: H) -> Option<ErrorResult<&'static str>>
//! where
//!     H: LogHelper<Submission, &'static str>,
//! {
//!     let logger = Dispatch::new(tracing_subscriber::registry());
//!     helper.log(Some(&logger), Some("10000;(cache) test error"), "detail", "SetRedis", submission)
//! }
//!
//! let submission = Submission { uuid: "u-1".into(), caption: "hi".into() };
//! assert!(set_redis(&submission, log_error_with::<Submission, &'static str>).is_some());
//! ```
//!
//! [`log_error`]: crate::log_error

use crate::attributes::Attributes;
use crate::logging::normalize;
use crate::models::ErrorResult;
use std::fmt;
use tracing::Dispatch;

/// A payload that knows how to describe itself as log attributes.
pub trait Loggable {
    fn attributes(&self) -> Attributes;
}

impl Loggable for Attributes {
    fn attributes(&self) -> Attributes {
        self.clone()
    }
}

impl<K, V> Loggable for [(K, V)]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn attributes(&self) -> Attributes {
        self.iter()
            .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
            .collect()
    }
}

impl<T: Loggable + ?Sized> Loggable for &T {
    fn attributes(&self) -> Attributes {
        (**self).attributes()
    }
}

/// Error-logging callback over a typed payload `P`.
pub trait LogHelper<P: ?Sized, E> {
    fn log(
        &self,
        logger: Option<&Dispatch>,
        source_error: Option<E>,
        detail: &str,
        context: &str,
        payload: &P,
    ) -> Option<ErrorResult<E>>;
}

impl<F, P, E> LogHelper<P, E> for F
where
    P: ?Sized,
    F: Fn(Option<&Dispatch>, Option<E>, &str, &str, &P) -> Option<ErrorResult<E>>,
{
    #[inline]
    fn log(
        &self,
        logger: Option<&Dispatch>,
        source_error: Option<E>,
        detail: &str,
        context: &str,
        payload: &P,
    ) -> Option<ErrorResult<E>> {
        self(logger, source_error, detail, context, payload)
    }
}

/// Log an error with the attributes declared by `payload`.
///
/// Same contract as [`log_error`](crate::log_error): `None` without side
/// effects when the logger or error is absent.
pub fn log_error_with<P, E>(
    logger: Option<&Dispatch>,
    source_error: Option<E>,
    detail: &str,
    context: &str,
    payload: &P,
) -> Option<ErrorResult<E>>
where
    P: Loggable + ?Sized,
    E: fmt::Display,
{
    let logger = logger?;
    let source_error = source_error?;
    Some(normalize(logger, source_error, detail, context, &payload.attributes()))
}
