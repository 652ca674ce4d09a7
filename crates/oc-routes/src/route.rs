//! Route-shape parsing
//!
//! Provides [`parse_route`], which matches a pathname against the ordered
//! route shapes (first match wins), and [`parse_location`], which adds the
//! selected annotation ids from the query string. The `*_with` variants take
//! the identifier classifier used for slug-route segments.

use crate::locator::EntityLocator;
use crate::path::{parse_annotation_ids, Location};
use oc_ident::IdClassifier;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Known URL shapes, in match order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteShape {
    /// `/corpus/{corpusId}/document/{documentId}`
    LegacyDocument,
    /// `/d/{creatorSlug}/{corpusSlug}/{documentSlug}`
    CorpusDocument,
    /// `/d/{creatorSlug}/{documentSlug}`
    StandaloneDocument,
    /// `/corpuses/{corpusId}`
    LegacyCorpus,
    /// `/c/{creatorSlug}/{corpusSlug}`
    Corpus,
}

impl RouteShape {
    /// All shapes in match order
    pub const ALL: [RouteShape; 5] = [
        RouteShape::LegacyDocument,
        RouteShape::CorpusDocument,
        RouteShape::StandaloneDocument,
        RouteShape::LegacyCorpus,
        RouteShape::Corpus,
    ];

    /// Name of the shape
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LegacyDocument => "legacy_document",
            Self::CorpusDocument => "corpus_document",
            Self::StandaloneDocument => "standalone_document",
            Self::LegacyCorpus => "legacy_corpus",
            Self::Corpus => "corpus",
        }
    }

    /// Whether the shape carries raw ids instead of slugs
    #[inline]
    #[must_use]
    pub fn is_legacy(self) -> bool {
        matches!(self, Self::LegacyDocument | Self::LegacyCorpus)
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::LegacyDocument => &LEGACY_DOCUMENT,
            Self::CorpusDocument => &CORPUS_DOCUMENT,
            Self::StandaloneDocument => &STANDALONE_DOCUMENT,
            Self::LegacyCorpus => &LEGACY_CORPUS,
            Self::Corpus => &CORPUS,
        }
    }

    fn build(self, caps: &Captures<'_>, classifier: &IdClassifier) -> Route {
        let seg = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        let classify = |creator: Option<&str>, i: usize| EntityLocator::classify(creator, seg(i), classifier);
        match self {
            Self::LegacyDocument => Route::Document {
                shape: self,
                corpus: Some(EntityLocator::id(seg(1))),
                document: EntityLocator::id(seg(2)),
            },
            Self::CorpusDocument => Route::Document {
                shape: self,
                corpus: Some(classify(Some(seg(1)), 2)),
                document: classify(None, 3),
            },
            Self::StandaloneDocument => Route::Document {
                shape: self,
                corpus: None,
                document: classify(Some(seg(1)), 2),
            },
            Self::LegacyCorpus => Route::Corpus {
                shape: self,
                corpus: EntityLocator::id(seg(1)),
            },
            Self::Corpus => Route::Corpus {
                shape: self,
                corpus: classify(Some(seg(1)), 2),
            },
        }
    }
}

impl Display for RouteShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Trailing slashes are tolerated; segments never contain '/'.
static LEGACY_DOCUMENT: Lazy<Regex> = Lazy::new(|| route_pattern(r"^/corpus/([^/]+)/document/([^/]+)/*$"));
static CORPUS_DOCUMENT: Lazy<Regex> = Lazy::new(|| route_pattern(r"^/d/([^/]+)/([^/]+)/([^/]+)/*$"));
static STANDALONE_DOCUMENT: Lazy<Regex> = Lazy::new(|| route_pattern(r"^/d/([^/]+)/([^/]+)/*$"));
static LEGACY_CORPUS: Lazy<Regex> = Lazy::new(|| route_pattern(r"^/corpuses/([^/]+)/*$"));
static CORPUS: Lazy<Regex> = Lazy::new(|| route_pattern(r"^/c/([^/]+)/([^/]+)/*$"));

fn route_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("route pattern is valid")
}

/// What a pathname selects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    /// A document, possibly within a corpus
    Document {
        /// Matched shape
        shape: RouteShape,
        /// Parent corpus
        corpus: Option<EntityLocator>,
        /// The document
        document: EntityLocator,
    },
    /// A corpus
    Corpus {
        /// Matched shape
        shape: RouteShape,
        /// The corpus
        corpus: EntityLocator,
    },
    /// Nothing selected
    None,
}

impl Route {
    /// Matched shape
    #[inline]
    #[must_use]
    pub fn shape(&self) -> Option<RouteShape> {
        match self {
            Self::Document { shape, .. } | Self::Corpus { shape, .. } => Some(*shape),
            Self::None => None,
        }
    }

    /// Corpus locator, if any
    #[inline]
    #[must_use]
    pub fn corpus(&self) -> Option<&EntityLocator> {
        match self {
            Self::Document { corpus, .. } => corpus.as_ref(),
            Self::Corpus { corpus, .. } => Some(corpus),
            Self::None => None,
        }
    }

    /// Document locator, if any
    #[inline]
    #[must_use]
    pub fn document(&self) -> Option<&EntityLocator> {
        match self {
            Self::Document { document, .. } => Some(document),
            _ => None,
        }
    }

    /// Whether nothing is selected
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Match a pathname against the route shapes
///
/// Query strings and fragments are ignored. Anything that does not match a
/// shape yields [`Route::None`].
///
/// # Example
/// ```
/// use oc_routes::{parse_route, EntityLocator, RouteShape};
///
/// let route = parse_route("/corpus/ID1/document/ID2");
/// assert_eq!(route.shape(), Some(RouteShape::LegacyDocument));
/// assert_eq!(route.corpus(), Some(&EntityLocator::id("ID1")));
/// assert_eq!(route.document(), Some(&EntityLocator::id("ID2")));
/// ```
#[inline]
#[must_use]
pub fn parse_route(pathname: &str) -> Route {
    parse_route_with(pathname, IdClassifier::shared())
}

/// Match a pathname, classifying slug-route segments with `classifier`
#[must_use]
pub fn parse_route_with(pathname: &str, classifier: &IdClassifier) -> Route {
    let location = Location::parse(pathname);
    RouteShape::ALL
        .into_iter()
        .find_map(|shape| {
            shape
                .pattern()
                .captures(location.path())
                .map(|caps| shape.build(&caps, classifier))
        })
        .unwrap_or(Route::None)
}

/// Route plus selected annotations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLocation {
    /// Selected entities
    pub route: Route,
    /// Annotation ids, `Some` only when a document route carries the
    /// parameter (an empty value gives an empty list)
    pub annotation_ids: Option<Vec<String>>,
}

/// Parse a full location
///
/// Annotation ids are read only for document routes.
#[inline]
#[must_use]
pub fn parse_location(location: &Location, annotation_param: &str) -> ParsedLocation {
    parse_location_with(location, annotation_param, IdClassifier::shared())
}

/// Parse a full location, classifying slug-route segments with `classifier`
#[must_use]
pub fn parse_location_with(
    location: &Location,
    annotation_param: &str,
    classifier: &IdClassifier,
) -> ParsedLocation {
    let route = parse_route_with(location.path(), classifier);
    let annotation_ids = match (&route, location.query()) {
        (Route::Document { .. }, Some(query)) if location.query_param(annotation_param).is_some() => {
            Some(parse_annotation_ids(query, annotation_param))
        }
        _ => None,
    };
    ParsedLocation {
        route,
        annotation_ids,
    }
}
