//! Correlation identifier generation.
//!
//! Every normalized error gets a short random identifier. It is embedded in
//! the detailed log record and in the response handed back to the caller, so
//! an operator can find the log line from a user-reported failure.
//!
//! Identifiers are NOT cryptographically secure and collisions are possible.
//! They exist for correlation, not for uniqueness guarantees.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

/// Length of every correlation identifier produced by this crate.
pub const IDENTIFIER_LEN: usize = 10;

/// Generate `length` characters drawn uniformly from `[a-zA-Z0-9]`.
///
/// Uses the thread-local RNG, so it is safe to call from any thread.
///
/// ```rust
/// let id = common_logger::identifier::generate(16);
/// assert_eq!(id.len(), 16);
/// assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
#[inline]
pub fn generate(length: usize) -> String {
    generate_with(&mut rand::thread_rng(), length)
}

/// Same as [`generate`], but draws from a caller-supplied RNG.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// A 10-character alphanumeric correlation identifier.
///
/// Only constructible through the generator, so the alphabet and length
/// invariants always hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a fresh identifier from the thread-local RNG.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(generate(IDENTIFIER_LEN))
    }

    /// Generate an identifier from a caller-supplied RNG.
    #[inline]
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(generate_with(rng, IDENTIFIER_LEN))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CorrelationId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CorrelationId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
