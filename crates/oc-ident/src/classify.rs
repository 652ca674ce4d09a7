//! Identifier classification
//!
//! Decides whether an opaque string is a canonical GraphQL id, a
//! human-readable slug, or neither.
//!
//! Canonical ids come in three shapes:
//! - prefixed with the reserved scheme marker (`gid:`)
//! - all digits, at least [`MIN_NUMERIC_ID_LEN`] long (heuristic)
//! - base64 that decodes to `<TypeName>:<integer>` (Relay global ids)
//!
//! A slug is anything matching `[a-zA-Z0-9]+([_-][a-zA-Z0-9]+)*` that is not
//! already a canonical id, so the two classes never overlap.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Reserved scheme prefix marking a canonical id
pub const ID_SCHEME_PREFIX: &str = "gid:";

/// Minimum length for an all-digit string to be treated as an id
pub const MIN_NUMERIC_ID_LEN: usize = 4;

/// Accepts padded and unpadded input, like the browser's `atob`.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]+(?:[_-][a-zA-Z0-9]+)*$").expect("slug pattern is valid")
});

static GLOBAL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+):([0-9]+)$").expect("global id pattern is valid"));

static DEFAULT_CLASSIFIER: Lazy<IdClassifier> = Lazy::new(IdClassifier::default);

/// Classification of an identifier string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierType {
    /// Canonical GraphQL id
    Id,
    /// Human-readable slug
    Slug,
    /// Neither, or ambiguous (bare short numbers)
    Unknown,
}

impl IdentifierType {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Slug => "slug",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for IdentifierType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a base64 global id (`<TypeName>:<integer>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedGlobalId {
    /// GraphQL type name, e.g. `CorpusType`
    pub type_name: String,
    /// Database key as decimal digits
    pub pk: String,
}

/// Identifier classifier
///
/// Stateless apart from its configuration. The free functions in this module
/// use a shared default instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdClassifier {
    scheme_prefix: String,
    min_numeric_len: usize,
}

impl IdClassifier {
    /// Create classifier with explicit prefix and numeric threshold
    #[inline]
    #[must_use]
    pub fn new(scheme_prefix: impl Into<String>, min_numeric_len: usize) -> Self {
        Self {
            scheme_prefix: scheme_prefix.into(),
            min_numeric_len,
        }
    }

    /// Shared default classifier, used by the free functions
    #[inline]
    #[must_use]
    pub fn shared() -> &'static IdClassifier {
        &DEFAULT_CLASSIFIER
    }

    /// Reserved scheme prefix
    #[inline]
    #[must_use]
    pub fn scheme_prefix(&self) -> &str {
        &self.scheme_prefix
    }

    /// Minimum length of an all-digit id
    #[inline]
    #[must_use]
    pub fn min_numeric_len(&self) -> usize {
        self.min_numeric_len
    }

    /// Check whether `value` is a canonical id
    ///
    /// Never fails: undecodable base64 simply means "not an id".
    #[must_use]
    pub fn is_valid_id(&self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }

        if !self.scheme_prefix.is_empty() && value.starts_with(&self.scheme_prefix) {
            return true;
        }

        if value.len() >= self.min_numeric_len && value.bytes().all(|b| b.is_ascii_digit()) {
            tracing::debug!(value, "numeric identifier accepted as canonical id");
            return true;
        }

        Self::decode_global_id(value).is_some()
    }

    /// Check whether `value` is a slug (and not an id)
    #[must_use]
    pub fn is_slug(&self, value: &str) -> bool {
        !value.is_empty() && !self.is_valid_id(value) && SLUG_PATTERN.is_match(value)
    }

    /// Classify `value`
    ///
    /// Bare numbers too short for the numeric heuristic match the slug
    /// pattern but are reported as [`IdentifierType::Unknown`]: a numeric
    /// slug and a numeric id cannot be told apart.
    #[must_use]
    pub fn identifier_type(&self, value: &str) -> IdentifierType {
        if self.is_valid_id(value) {
            IdentifierType::Id
        } else if self.is_slug(value) {
            if value.bytes().all(|b| b.is_ascii_digit()) {
                IdentifierType::Unknown
            } else {
                IdentifierType::Slug
            }
        } else {
            IdentifierType::Unknown
        }
    }

    /// Decode a base64 global id into its type name and key
    #[must_use]
    pub fn decode_global_id(value: &str) -> Option<DecodedGlobalId> {
        let bytes = LENIENT_BASE64.decode(value).ok()?;
        let decoded = String::from_utf8(bytes).ok()?;
        let caps = GLOBAL_ID_PATTERN.captures(&decoded)?;

        Some(DecodedGlobalId {
            type_name: caps[1].to_string(),
            pk: caps[2].to_string(),
        })
    }
}

impl Default for IdClassifier {
    fn default() -> Self {
        Self::new(ID_SCHEME_PREFIX, MIN_NUMERIC_ID_LEN)
    }
}

/// Check whether `value` is a canonical id (default classifier)
#[inline]
#[must_use]
pub fn is_valid_id(value: &str) -> bool {
    DEFAULT_CLASSIFIER.is_valid_id(value)
}

/// Check whether `value` is a slug (default classifier)
#[inline]
#[must_use]
pub fn is_slug(value: &str) -> bool {
    DEFAULT_CLASSIFIER.is_slug(value)
}

/// Classify `value` (default classifier)
#[inline]
#[must_use]
pub fn identifier_type(value: &str) -> IdentifierType {
    DEFAULT_CLASSIFIER.identifier_type(value)
}

/// Decode a base64 global id
#[inline]
#[must_use]
pub fn decode_global_id(value: &str) -> Option<DecodedGlobalId> {
    IdClassifier::decode_global_id(value)
}
