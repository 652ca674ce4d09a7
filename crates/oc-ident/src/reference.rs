//! Entity references
//!
//! Provides [`EntityRef`], the minimal corpus/document shape needed to build a
//! canonical URL or validate a query variable, plus helpers that refuse to
//! build references out of slugs. A slug stored where an id is expected
//! silently corrupts id-keyed cache lookups.

use crate::classify::{identifier_type, is_valid_id};
use crate::error::IdentError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Minimal entity reference (corpus or document)
///
/// # Example
/// ```
/// use oc_ident::{CreatorRef, EntityRef};
///
/// let corpus = EntityRef::new("Q29ycHVzVHlwZTo0Mg==")
///     .with_slug("my-corpus")
///     .with_creator(CreatorRef::new("VXNlclR5cGU6Mw==").with_slug("john"));
/// assert_eq!(corpus.creator_slug(), Some("john"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity identifier
    pub id: String,

    /// Human-readable slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Owning user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorRef>,
}

/// Creator (user) reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatorRef {
    /// User identifier
    pub id: String,

    /// User slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Optional fields attached by [`create_safe_entity_reference`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityExtras {
    /// Entity slug
    pub slug: Option<String>,
    /// Creator reference
    pub creator: Option<CreatorRef>,
}

impl EntityRef {
    /// Reference carrying only an id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: None,
            creator: None,
        }
    }

    /// With entity slug
    #[inline]
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// With creator
    #[inline]
    #[must_use]
    pub fn with_creator(mut self, creator: CreatorRef) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Non-empty entity slug
    #[inline]
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|s| !s.is_empty())
    }

    /// Non-empty creator slug
    #[inline]
    #[must_use]
    pub fn creator_slug(&self) -> Option<&str> {
        self.creator.as_ref().and_then(CreatorRef::slug)
    }

    /// Whether the id is a canonical id
    #[inline]
    #[must_use]
    pub fn has_valid_id(&self) -> bool {
        is_valid_id(&self.id)
    }
}

impl CreatorRef {
    /// Creator carrying only an id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: None,
        }
    }

    /// With user slug
    #[inline]
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Non-empty user slug
    #[inline]
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|s| !s.is_empty())
    }
}

/// Anything that may carry an `id` field
pub trait HasId {
    /// Raw id value, if any
    fn raw_id(&self) -> Option<&str>;
}

impl HasId for EntityRef {
    fn raw_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl HasId for CreatorRef {
    fn raw_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl HasId for serde_json::Value {
    fn raw_id(&self) -> Option<&str> {
        self.get("id").and_then(serde_json::Value::as_str)
    }
}

impl<T: HasId + ?Sized> HasId for &T {
    fn raw_id(&self) -> Option<&str> {
        (**self).raw_id()
    }
}

/// Extract `obj.id` only if it is a canonical id
#[must_use]
pub fn safe_extract_id<T: HasId + ?Sized>(obj: Option<&T>) -> Option<&str> {
    obj.and_then(|o| o.raw_id()).filter(|id| is_valid_id(id))
}

/// Build a reference only when `id_or_slug` is a canonical id
#[must_use]
pub fn create_safe_entity_reference(
    id_or_slug: &str,
    extra: Option<EntityExtras>,
) -> Option<EntityRef> {
    if !is_valid_id(id_or_slug) {
        tracing::debug!(
            value = id_or_slug,
            kind = %identifier_type(id_or_slug),
            "refusing to build entity reference from non-id"
        );
        return None;
    }

    let extra = extra.unwrap_or_default();
    Some(EntityRef {
        id: id_or_slug.to_string(),
        slug: extra.slug,
        creator: extra.creator,
    })
}

/// Identifier proven to be canonical
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Parse a canonical id
    ///
    /// # Errors
    /// - [`IdentError::Empty`] for empty input
    /// - [`IdentError::NotCanonical`] for slugs and unknown values
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdentError::Empty);
        }
        if !is_valid_id(&value) {
            let kind = identifier_type(&value);
            return Err(IdentError::NotCanonical { value, kind });
        }
        Ok(Self(value))
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for CanonicalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CanonicalId {
    type Error = IdentError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for CanonicalId {
    type Error = IdentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl<'de> Deserialize<'de> for CanonicalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}
