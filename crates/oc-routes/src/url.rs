//! Canonical URL builder
//!
//! Canonical URLs are built from slugs only:
//!
//! ```text
//! /c/{creatorSlug}/{corpusSlug}                    corpus
//! /d/{creatorSlug}/{corpusSlug}/{documentSlug}     document within a corpus
//! /d/{creatorSlug}/{documentSlug}                  standalone document
//! ```
//!
//! When a slug is missing the builder returns the unresolved placeholder
//! (`#`) instead of an id-bearing URL.

use crate::error::RouteError;
use crate::path::{with_annotation_query, ANNOTATION_PARAM};
use oc_ident::EntityRef;

/// Placeholder returned when a canonical URL cannot be built
pub const UNRESOLVED_URL: &str = "#";

/// Which URL shape to build for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTemplate<'a> {
    /// `/c/{creator}/{corpus}`
    Corpus,
    /// `/d/{corpusCreator}/{corpus}/{document}`, or `/d/{creator}/{document}`
    /// when no parent corpus is given
    Document {
        /// Parent corpus
        corpus: Option<&'a EntityRef>,
    },
}

fn required<'e>(value: Option<&'e str>, field: &'static str, entity: &EntityRef) -> Result<&'e str, RouteError> {
    value.ok_or_else(|| RouteError::missing_slug(field, entity.id.as_str()))
}

/// Build a canonical URL, reporting the first missing slug
///
/// # Errors
/// [`RouteError::MissingSlug`] when the entity, its creator or the parent
/// corpus lacks a slug.
pub fn try_entity_url(entity: &EntityRef, template: RouteTemplate<'_>) -> Result<String, RouteError> {
    match template {
        RouteTemplate::Corpus => {
            let creator = required(entity.creator_slug(), "creator", entity)?;
            let corpus = required(entity.slug(), "corpus", entity)?;
            Ok(format!("/c/{creator}/{corpus}"))
        }
        RouteTemplate::Document { corpus: Some(corpus) } => {
            let creator = required(corpus.creator_slug(), "creator", corpus)?;
            let corpus_slug = required(corpus.slug(), "corpus", corpus)?;
            let document = required(entity.slug(), "document", entity)?;
            Ok(format!("/d/{creator}/{corpus_slug}/{document}"))
        }
        RouteTemplate::Document { corpus: None } => {
            let creator = required(entity.creator_slug(), "creator", entity)?;
            let document = required(entity.slug(), "document", entity)?;
            Ok(format!("/d/{creator}/{document}"))
        }
    }
}

/// Canonical URL builder
///
/// Carries the unresolved placeholder and the annotation parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    unresolved: String,
    annotation_param: String,
}

impl UrlBuilder {
    /// Builder with default placeholder and parameter name
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With custom unresolved placeholder
    #[must_use]
    pub fn with_unresolved(mut self, placeholder: impl Into<String>) -> Self {
        self.unresolved = placeholder.into();
        self
    }

    /// With custom annotation query parameter
    #[must_use]
    pub fn with_annotation_param(mut self, param: impl Into<String>) -> Self {
        self.annotation_param = param.into();
        self
    }

    /// Unresolved placeholder
    #[inline]
    #[must_use]
    pub fn unresolved(&self) -> &str {
        &self.unresolved
    }

    /// Annotation query parameter name
    #[inline]
    #[must_use]
    pub fn annotation_param(&self) -> &str {
        &self.annotation_param
    }

    /// Whether `url` is the unresolved placeholder
    #[inline]
    #[must_use]
    pub fn is_unresolved(&self, url: &str) -> bool {
        url == self.unresolved
    }

    /// Canonical URL for `entity`, or the placeholder
    #[must_use]
    pub fn entity_url(&self, entity: &EntityRef, template: RouteTemplate<'_>) -> String {
        try_entity_url(entity, template).unwrap_or_else(|err| {
            tracing::debug!("Cannot build canonical url: {}", err);
            self.unresolved.clone()
        })
    }

    /// Canonical corpus URL
    #[inline]
    #[must_use]
    pub fn corpus_url(&self, corpus: &EntityRef) -> String {
        self.entity_url(corpus, RouteTemplate::Corpus)
    }

    /// Canonical document URL, nested under `corpus` when given
    #[inline]
    #[must_use]
    pub fn document_url(&self, document: &EntityRef, corpus: Option<&EntityRef>) -> String {
        self.entity_url(document, RouteTemplate::Document { corpus })
    }

    /// Append selected annotation ids to a built URL
    #[must_use]
    pub fn with_annotations<S: AsRef<str>>(&self, url: &str, ids: &[S]) -> String {
        if self.is_unresolved(url) {
            return url.to_string();
        }
        with_annotation_query(url, ids, &self.annotation_param)
    }
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self {
            unresolved: UNRESOLVED_URL.to_string(),
            annotation_param: ANNOTATION_PARAM.to_string(),
        }
    }
}

/// Canonical URL for `entity`, or `"#"` if any required slug is missing
///
/// # Example
/// ```
/// use oc_ident::{CreatorRef, EntityRef};
/// use oc_routes::{get_entity_url, RouteTemplate};
///
/// let corpus = EntityRef::new("Q29ycHVzVHlwZTo0Mg==")
///     .with_slug("my-corpus")
///     .with_creator(CreatorRef::new("VXNlclR5cGU6Mw==").with_slug("john"));
/// assert_eq!(get_entity_url(&corpus, RouteTemplate::Corpus), "/c/john/my-corpus");
///
/// let bare = EntityRef::new("Q29ycHVzVHlwZTo0Mg==");
/// assert_eq!(get_entity_url(&bare, RouteTemplate::Corpus), "#");
/// ```
#[must_use]
pub fn get_entity_url(entity: &EntityRef, template: RouteTemplate<'_>) -> String {
    try_entity_url(entity, template).unwrap_or_else(|_| UNRESOLVED_URL.to_string())
}

/// Canonical corpus URL
#[inline]
#[must_use]
pub fn get_corpus_url(corpus: &EntityRef) -> String {
    get_entity_url(corpus, RouteTemplate::Corpus)
}

/// Canonical document URL
#[inline]
#[must_use]
pub fn get_document_url(document: &EntityRef, corpus: Option<&EntityRef>) -> String {
    get_entity_url(document, RouteTemplate::Document { corpus })
}

#[cfg(test)]
mod tests {
    use super::*;
    use oc_ident::CreatorRef;
    use pretty_assertions::assert_eq;

    fn john() -> CreatorRef {
        CreatorRef::new("VXNlclR5cGU6Mw==").with_slug("john")
    }

    fn corpus() -> EntityRef {
        EntityRef::new("Q29ycHVzVHlwZTo0Mg==")
            .with_slug("my-corpus")
            .with_creator(john())
    }

    fn document() -> EntityRef {
        EntityRef::new("RG9jdW1lbnRUeXBlOjc=")
            .with_slug("lease-2021")
            .with_creator(CreatorRef::new("VXNlclR5cGU6NA==").with_slug("jane"))
    }

    #[test]
    fn corpus_url() {
        assert_eq!(get_corpus_url(&corpus()), "/c/john/my-corpus");
    }

    #[test]
    fn document_in_corpus_uses_corpus_creator() {
        assert_eq!(
            get_document_url(&document(), Some(&corpus())),
            "/d/john/my-corpus/lease-2021"
        );
    }

    #[test]
    fn standalone_document_uses_own_creator() {
        assert_eq!(get_document_url(&document(), None), "/d/jane/lease-2021");
    }

    #[test]
    fn missing_slugs_fall_back() {
        let no_slug = EntityRef::new("Q29ycHVzVHlwZTo0Mg==").with_creator(john());
        assert_eq!(get_corpus_url(&no_slug), UNRESOLVED_URL);

        let empty_slug = corpus().with_slug("");
        assert_eq!(get_corpus_url(&empty_slug), UNRESOLVED_URL);

        let no_creator_slug = EntityRef::new("Q29ycHVzVHlwZTo0Mg==")
            .with_slug("my-corpus")
            .with_creator(CreatorRef::new("VXNlclR5cGU6Mw=="));
        assert_eq!(get_corpus_url(&no_creator_slug), UNRESOLVED_URL);

        let bare_corpus = EntityRef::new("Q29ycHVzVHlwZTo0Mg==");
        assert_eq!(get_document_url(&document(), Some(&bare_corpus)), UNRESOLVED_URL);
    }

    #[test]
    fn fallback_never_contains_id() {
        let bare = EntityRef::new("Q29ycHVzVHlwZTo0Mg==").with_slug("my-corpus");
        assert!(!get_corpus_url(&bare).contains(&bare.id));
    }

    #[test]
    fn try_reports_missing_field() {
        let err = try_entity_url(&EntityRef::new("x"), RouteTemplate::Corpus).unwrap_err();
        assert_eq!(err, RouteError::missing_slug("creator", "x"));

        let err = try_entity_url(
            &EntityRef::new("d").with_creator(john()),
            RouteTemplate::Document { corpus: Some(&corpus()) },
        )
        .unwrap_err();
        assert_eq!(err, RouteError::missing_slug("document", "d"));
    }

    #[test]
    fn builder_custom_placeholder() {
        let builder = UrlBuilder::new().with_unresolved("/unresolved");
        assert_eq!(builder.corpus_url(&EntityRef::new("x")), "/unresolved");
        assert!(builder.is_unresolved("/unresolved"));
        assert_eq!(
            builder.with_annotations("/unresolved", &["A"]),
            "/unresolved"
        );
    }

    #[test]
    fn builder_annotations() {
        let builder = UrlBuilder::new();
        let url = builder.document_url(&document(), Some(&corpus()));
        assert_eq!(
            builder.with_annotations(&url, &["A", "B"]),
            "/d/john/my-corpus/lease-2021?ann=A,B"
        );
    }
}
