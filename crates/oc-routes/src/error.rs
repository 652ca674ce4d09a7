//! Error types for URL building

/// Why a canonical URL could not be built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A slug the URL shape needs is absent or empty
    #[error("missing {field} slug for entity '{entity_id}'")]
    MissingSlug {
        /// Which slug was missing (`creator`, `corpus`, `document`)
        field: &'static str,
        /// Id of the entity whose URL was requested
        entity_id: String,
    },
}

impl RouteError {
    /// Create a missing-slug error
    #[inline]
    #[must_use]
    pub fn missing_slug(field: &'static str, entity_id: impl Into<String>) -> Self {
        Self::MissingSlug {
            field,
            entity_id: entity_id.into(),
        }
    }
}
