//! Entity locators
//!
//! A locator is what a URL tells us about an entity before it is loaded: an
//! id, a slug under a creator, or a segment too ambiguous to decide.

use oc_ident::{EntityRef, IdClassifier, IdentifierType};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// How a route segment identifies an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityLocator {
    /// Canonical id (or raw legacy-route placeholder)
    Id {
        /// Entity id
        id: String,
    },
    /// Human-readable slug
    Slug {
        /// Owning user's slug, when the URL scopes by creator
        creator: Option<String>,
        /// Entity slug
        slug: String,
    },
    /// Neither id nor slug (e.g. purely numeric)
    Ambiguous {
        /// Owning user's slug, when the URL scopes by creator
        creator: Option<String>,
        /// Raw segment
        value: String,
    },
}

impl EntityLocator {
    /// Locator for a known id
    #[inline]
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id { id: id.into() }
    }

    /// Slug locator
    #[inline]
    #[must_use]
    pub fn slug(creator: Option<&str>, slug: impl Into<String>) -> Self {
        Self::Slug {
            creator: creator.map(ToString::to_string),
            slug: slug.into(),
        }
    }

    /// Classify a slug-route segment with the default classifier
    #[inline]
    #[must_use]
    pub fn from_segment(creator: Option<&str>, segment: &str) -> Self {
        Self::classify(creator, segment, IdClassifier::shared())
    }

    /// Classify a slug-route segment with `classifier`
    #[must_use]
    pub fn classify(creator: Option<&str>, segment: &str, classifier: &IdClassifier) -> Self {
        let creator = creator.map(ToString::to_string);
        match classifier.identifier_type(segment) {
            IdentifierType::Id => Self::Id {
                id: segment.to_string(),
            },
            IdentifierType::Slug => Self::Slug {
                creator,
                slug: segment.to_string(),
            },
            IdentifierType::Unknown => {
                tracing::debug!("Ambiguous route segment: {}", segment);
                Self::Ambiguous {
                    creator,
                    value: segment.to_string(),
                }
            }
        }
    }

    /// Id, if the locator carries one
    #[inline]
    #[must_use]
    pub fn as_id(&self) -> Option<&str> {
        match self {
            Self::Id { id } => Some(id),
            _ => None,
        }
    }

    /// Whether `entity` is the entity this locator points at
    ///
    /// Ambiguous locators match either the id or the slug.
    #[must_use]
    pub fn matches(&self, entity: &EntityRef) -> bool {
        match self {
            Self::Id { id } => entity.id == *id,
            Self::Slug { creator, slug } => {
                entity.slug() == Some(slug.as_str()) && creator_matches(creator.as_deref(), entity)
            }
            Self::Ambiguous { creator, value } => {
                entity.id == *value
                    || (entity.slug() == Some(value.as_str())
                        && creator_matches(creator.as_deref(), entity))
            }
        }
    }
}

fn creator_matches(creator: Option<&str>, entity: &EntityRef) -> bool {
    match (creator, entity.creator_slug()) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => true,
    }
}

impl Display for EntityLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id { id } => write!(f, "id:{id}"),
            Self::Slug {
                creator: Some(creator),
                slug,
            } => write!(f, "slug:{creator}/{slug}"),
            Self::Slug { creator: None, slug } => write!(f, "slug:{slug}"),
            Self::Ambiguous { value, .. } => write!(f, "ambiguous:{value}"),
        }
    }
}

impl From<&EntityRef> for EntityLocator {
    fn from(entity: &EntityRef) -> Self {
        Self::id(entity.id.clone())
    }
}
