//! Browser locations and canonical-path equivalence
//!
//! Provides [`Location`], a pathname plus optional query string, and
//! [`is_canonical_path`], which decides whether a navigation is needed.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Query parameter carrying selected annotation ids
pub const ANNOTATION_PARAM: &str = "ann";

/// Pathname plus query string
///
/// Fragments are dropped on parse.
///
/// # Examples
/// - `/c/john/my-corpus?ann=A` → path `/c/john/my-corpus`, query `ann=A`
/// - `/c/john/my-corpus/` → path `/c/john/my-corpus/`, no query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location {
    path: String,
    query: Option<String>,
}

impl Location {
    /// Split a location string into path and query
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let location = location.split('#').next().unwrap_or_default();
        match location.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: Some(query.to_string()).filter(|q| !q.is_empty()),
            },
            None => Self {
                path: location.to_string(),
                query: None,
            },
        }
    }

    /// Build from separate parts
    ///
    /// A leading `?` on `search` is ignored.
    #[must_use]
    pub fn from_parts(path: impl Into<String>, search: &str) -> Self {
        let search = search.strip_prefix('?').unwrap_or(search);
        Self {
            path: path.into(),
            query: Some(search.to_string()).filter(|q| !q.is_empty()),
        }
    }

    /// Raw pathname
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string without the leading `?`
    #[inline]
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Pathname without trailing slashes
    #[inline]
    #[must_use]
    pub fn normalized_path(&self) -> &str {
        normalize_path(&self.path)
    }

    /// First value of a query parameter
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.as_deref().and_then(|q| query_param(q, name))
    }

    /// Replace the path, keeping the query
    #[must_use]
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: self.query.clone(),
        }
    }

    /// Whether this location points at `target`, ignoring query and trailing slashes
    #[inline]
    #[must_use]
    pub fn is_at(&self, target: &str) -> bool {
        self.normalized_path() == normalize_path(strip_query(target))
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{}", self.path, query),
            None => f.write_str(&self.path),
        }
    }
}

impl FromStr for Location {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Location {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Strip trailing slashes from a pathname
#[inline]
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    path.trim_end_matches('/')
}

fn strip_query(location: &str) -> &str {
    location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
}

/// Whether `current` already is the canonical `target`
///
/// Query strings and trailing slashes are ignored on both sides, so this is
/// an equivalence relation over locations.
///
/// # Example
/// ```
/// use oc_routes::is_canonical_path;
///
/// assert!(is_canonical_path("/c/john/my-corpus/", "/c/john/my-corpus"));
/// assert!(is_canonical_path("/c/john/my-corpus?x=1", "/c/john/my-corpus"));
/// assert!(!is_canonical_path("/a", "/b"));
/// ```
#[must_use]
pub fn is_canonical_path(current: &str, target: &str) -> bool {
    normalize_path(strip_query(current)) == normalize_path(strip_query(target))
}

fn query_param<'q>(query: &'q str, name: &str) -> Option<&'q str> {
    query
        .split('&')
        .filter_map(|pair| match pair.split_once('=') {
            Some((key, value)) => Some((key, value)),
            None if !pair.is_empty() => Some((pair, "")),
            None => None,
        })
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Selected annotation ids from a query string
///
/// Accepts the query with or without a leading `?`. Empty list entries are
/// dropped; a missing parameter yields an empty list.
#[must_use]
pub fn parse_annotation_ids(search: &str, param: &str) -> Vec<String> {
    let search = search.strip_prefix('?').unwrap_or(search);
    query_param(search, param)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Append the annotation parameter to a path
///
/// Returns `path` untouched when `ids` is empty or the path is the unresolved
/// placeholder.
#[must_use]
pub fn with_annotation_query<S: AsRef<str>>(path: &str, ids: &[S], param: &str) -> String {
    if ids.is_empty() || path.starts_with('#') {
        return path.to_string();
    }
    let joined = ids.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{param}={joined}")
}
