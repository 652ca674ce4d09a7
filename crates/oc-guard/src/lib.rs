//! OC Query Guard
//!
//! The single choke point between component code and the GraphQL transport:
//! - Validates identifier variables before a query is dispatched
//! - Defaults missing required variables instead of blocking
//! - Wraps query functions so that blocked or failed queries become values
//!
//! GraphQL backends reject or mis-resolve a slug passed where an id is
//! expected. Nothing in this crate fails across its public boundary; callers
//! inspect [`GuardResult::can_execute`] and [`SafeQueryOutcome`] instead.
//!
//! # Example
//!
//! ```rust
//! use oc_guard::{guard_query, CorpusField, CorpusVariables, GuardConfig};
//!
//! let config = GuardConfig::new().with_id_fields([CorpusField::CorpusId]);
//! let result = guard_query(CorpusVariables::new("my-corpus-slug"), &config);
//!
//! assert!(!result.can_execute);
//! assert!(result.error_messages()[0].contains("corpusId"));
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

// Core modules
pub mod error;
pub mod executor;
pub mod guard;
pub mod transport;
pub mod variables;

// Re-exports for convenience
pub use error::{GuardError, TransportError};
pub use executor::{create_safe_query_executor, SafeQueryExecutor, SafeQueryOutcome};
pub use guard::{
    ensure_valid_entity_id, ensure_valid_id_variables, guard_query, ErrorCallback, GuardConfig,
    GuardResult, ValidatedId,
};
pub use transport::{run_guarded, GraphQlError, GraphQlResponse, HttpTransport, QueryTransport};
pub use variables::{
    CorpusField, CorpusVariables, DocumentField, DocumentVariables, FieldValue, QueryVariables,
    SlugRouteField, SlugRouteVariables, VariableMap,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for guarded queries
    pub use crate::{
        create_safe_query_executor, guard_query, GuardConfig, GuardResult, QueryTransport,
        QueryVariables, SafeQueryOutcome,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
