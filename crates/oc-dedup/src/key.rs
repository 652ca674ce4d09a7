//! Request keys
//!
//! A key is a category tag plus an ordered list of optional identifier parts.
//! Equality and hashing use the structured parts, so tuples that render to
//! the same string (`("a-b", None)` and `("a", "b")`) stay distinct. The
//! rendered form skips absent parts: `corpus-u1-c1`.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Semantic identity of a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RequestKey {
    category: String,
    parts: Vec<Option<String>>,
}

impl RequestKey {
    /// Build a key from a category and optional parts
    pub fn new<I, S>(category: impl Into<String>, parts: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            category: category.into(),
            parts: parts.into_iter().map(|p| p.map(Into::into)).collect(),
        }
    }

    /// Category tag
    #[inline]
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Present parts, in order
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(Option::as_deref)
    }

    /// Number of slots, present or not
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parts.len()
    }
}

impl Display for RequestKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.category)?;
        for part in self.parts() {
            write!(f, "-{part}")?;
        }
        Ok(())
    }
}

/// Build a request key
///
/// Same inputs always yield equal keys.
pub fn build_request_key<I, S>(category: &str, parts: I) -> RequestKey
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    RequestKey::new(category, parts)
}
