//! Grouped key/value attributes.
//!
//! Callers pass attributes as a flat, alternating `key, value, key, value`
//! slice. [`Attributes`] is the parsed form. In a log record the whole group
//! is rendered as one JSON object under the `args` field, so log pipelines see
//! a nested object the same way they would for any grouped attribute.

use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;
use std::fmt;

/// Error returned when a flat pair list cannot be grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeError {
    /// The slice had an odd number of entries; the last key has no value.
    OddCount { len: usize },
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OddCount { len } => {
                write!(f, "attribute list has odd length {} (expected key/value pairs)", len)
            }
        }
    }
}

impl std::error::Error for AttributeError {}

/// Ordered key/value attribute group.
///
/// Most call sites pass two or three pairs, which stay inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: SmallVec<[(String, String); 4]>,
}

impl Attributes {
    /// Empty group.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a flat alternating key/value slice.
    ///
    /// # Errors
    ///
    /// [`AttributeError::OddCount`] when a trailing key has no value.
    ///
    /// ```rust
    /// use common_logger::Attributes;
    ///
    /// let attrs = Attributes::from_pairs(&["campaignUUID", "42", "caption", "hi"]).unwrap();
    /// assert_eq!(attrs.len(), 2);
    /// assert!(Attributes::from_pairs(&["dangling"]).is_err());
    /// ```
    pub fn from_pairs(flat: &[&str]) -> Result<Self, AttributeError> {
        if flat.len() % 2 != 0 {
            return Err(AttributeError::OddCount { len: flat.len() });
        }

        let pairs = flat
            .chunks_exact(2)
            .map(|kv| (kv[0].to_owned(), kv[1].to_owned()))
            .collect();

        Ok(Self { pairs })
    }

    /// Append one pair, builder style.
    #[inline]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    #[inline]
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Value of the first pair with `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pairs.len()))?;
        for (k, v) in &self.pairs {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl fmt::Display for Attributes {
    /// Renders as a JSON object, e.g. `{"uuid":"...","caption":"..."}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
