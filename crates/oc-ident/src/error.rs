//! Error types for identifier parsing

use crate::classify::IdentifierType;

/// Errors raised when a value is required to be a canonical id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentError {
    /// Empty input
    #[error("identifier cannot be empty")]
    Empty,

    /// Value is not a canonical id
    #[error("'{value}' is not a canonical id (classified as {kind})")]
    NotCanonical {
        /// Offending value
        value: String,
        /// What the value classified as instead
        kind: IdentifierType,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_canonical_display_names_value_and_kind() {
        let err = IdentError::NotCanonical {
            value: "my-corpus".to_string(),
            kind: IdentifierType::Slug,
        };
        assert_eq!(
            err.to_string(),
            "'my-corpus' is not a canonical id (classified as slug)"
        );
    }
}
