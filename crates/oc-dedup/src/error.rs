//! Error types for request deduplication

/// Errors during tracked requests
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DedupError {
    /// A key was reused for a request with a different result type
    #[error("type mismatch for request '{key}': expected {expected}, in-flight request is {actual}")]
    TypeMismatch {
        /// Rendered request key
        key: String,
        /// Type requested by the caller
        expected: &'static str,
        /// Type produced by the in-flight request
        actual: &'static str,
    },
}
