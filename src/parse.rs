//! Error text conventions.
//!
//! Errors raised by services follow two string conventions:
//!
//! - `code;message` marks a coded domain error. Errors without a `;` come
//!   from dependencies and carry no code.
//! - The first `(token)` names the subsystem that raised the error (the
//!   *log source*), used for grouping log records.
//!
//! ```text
//! 10000;(collection) MySQL fatal error
//! ^^^^^  ^^^^^^^^^^
//! code   log source
//! ```
//!
//! Both conventions live here so emission code never touches raw text.

use once_cell::sync::Lazy;
use regex::Regex;

static LOG_SOURCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((.*?)\)").expect("log source pattern is valid"));

/// Separator between an error code and its message.
pub const CODE_SEPARATOR: char = ';';

/// Borrowed view of an error's text split along the conventions above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedError<'a> {
    /// Inner text of the first `(...)`, or `""` when there is none.
    pub logsource: &'a str,
    /// Text before the first `;`, if any.
    pub code: Option<&'a str>,
    /// Text after the first `;`, or the whole text when uncoded.
    pub message: &'a str,
}

impl<'a> ParsedError<'a> {
    #[inline]
    pub const fn is_coded(&self) -> bool {
        self.code.is_some()
    }
}

/// Return the inner text of the first parenthesized substring.
///
/// Unbalanced parentheses yield `""`; absence is not an error.
///
/// ```rust
/// use common_logger::parse::extract_log_source;
///
/// assert_eq!(extract_log_source("10000;(collection) MySQL fatal error"), "collection");
/// assert_eq!(extract_log_source("10000;(collection MySQL fatal error"), "");
/// ```
pub fn extract_log_source(text: &str) -> &str {
    LOG_SOURCE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

/// Split on the first `;` into `(code, message)`.
#[inline]
pub fn split_code(text: &str) -> (Option<&str>, &str) {
    match text.split_once(CODE_SEPARATOR) {
        Some((code, message)) => (Some(code), message),
        None => (None, text),
    }
}

/// Parse error text into log source, code and message.
pub fn parse_error_text(text: &str) -> ParsedError<'_> {
    let (code, message) = split_code(text);
    ParsedError {
        logsource: extract_log_source(text),
        code,
        message,
    }
}
