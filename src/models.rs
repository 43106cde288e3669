//! Result types handed back to callers of the error normalizer.

use crate::identifier::CorrelationId;
use std::error::Error;
use std::fmt;

/// Caller-facing error message that carries the correlation identifier.
///
/// Format: `{original error text};{identifier}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    text: String,
}

impl ResponseError {
    pub(crate) fn new(error_text: &str, identifier: &CorrelationId) -> Self {
        let mut text = String::with_capacity(error_text.len() + 1 + identifier.len());
        text.push_str(error_text);
        text.push(crate::parse::CODE_SEPARATOR);
        text.push_str(identifier.as_str());
        Self { text }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Error for ResponseError {}

/// Normalized outcome of logging one error.
///
/// Built fresh on every call and never mutated afterwards. The source error
/// is moved in unchanged and can be taken back with [`into_source`].
///
/// [`into_source`]: ErrorResult::into_source
#[derive(Debug)]
#[must_use = "the result carries the identifier needed to correlate the log record"]
pub struct ErrorResult<E> {
    identifier: CorrelationId,
    context: String,
    source_error: E,
    response_error: Option<ResponseError>,
}

impl<E> ErrorResult<E> {
    pub(crate) fn new(
        identifier: CorrelationId,
        context: &str,
        source_error: E,
        response_error: Option<ResponseError>,
    ) -> Self {
        Self {
            identifier,
            context: context.to_owned(),
            source_error,
            response_error,
        }
    }

    /// Correlation identifier shared with the emitted log record.
    #[inline]
    pub fn identifier(&self) -> &CorrelationId {
        &self.identifier
    }

    /// Context label supplied by the caller.
    #[inline]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[inline]
    pub fn source_error(&self) -> &E {
        &self.source_error
    }

    /// Present only for coded errors (`code;message`).
    #[inline]
    pub fn response_error(&self) -> Option<&ResponseError> {
        self.response_error.as_ref()
    }

    #[inline]
    pub fn into_source(self) -> E {
        self.source_error
    }
}

impl<E: fmt::Display> fmt::Display for ErrorResult<E> {
    /// Shows the response message when one exists, otherwise the source
    /// error followed by its identifier.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.response_error {
            Some(response) => fmt::Display::fmt(response, f),
            None => write!(f, "{} (id: {})", self.source_error, self.identifier),
        }
    }
}

impl<E> Error for ErrorResult<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source_error)
    }
}
