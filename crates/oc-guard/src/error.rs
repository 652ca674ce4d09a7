//! Error types for the query guard
//!
//! - [`GuardError`]: validation findings, reported as values in a
//!   [`GuardResult`](crate::GuardResult)
//! - [`TransportError`]: failures of the GraphQL transport

/// Validation finding for a query variable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// Required field missing or empty
    #[error("missing required field: {field}")]
    MissingRequired {
        /// GraphQL variable name
        field: String,
    },

    /// Identifier field carries something other than a canonical id
    #[error("invalid id for field {field}: '{value}'")]
    InvalidId {
        /// GraphQL variable name
        field: String,
        /// Offending value
        value: String,
    },
}

impl GuardError {
    /// Create missing-field error
    pub fn missing(field: impl ToString) -> Self {
        Self::MissingRequired {
            field: field.to_string(),
        }
    }

    /// Create invalid-id error
    pub fn invalid_id(field: impl ToString, value: impl Into<String>) -> Self {
        Self::InvalidId {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Variable name the finding refers to
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequired { field } | Self::InvalidId { field, .. } => field,
        }
    }

    /// Whether this finding blocks execution
    #[inline]
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::InvalidId { .. })
    }
}

/// GraphQL transport failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP layer failed
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Variables could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server answered with errors and no data
    #[error("graphql errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// Any other transport failure
    #[error("transport error: {0}")]
    Other(String),
}
