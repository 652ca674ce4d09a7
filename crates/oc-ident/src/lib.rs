//! OC Identifier System
//!
//! Classification of opaque entity identifiers coming from URLs, cache
//! entries and loosely typed GraphQL payloads.
//!
//! # Overview
//!
//! The identifier system provides:
//! - **IdClassifier**: canonical id / slug / unknown classification
//! - **EntityRef**: minimal corpus or document reference used to build URLs
//! - **CanonicalId**: an identifier proven to be a canonical id
//!
//! Every function here is total. Malformed base64, empty strings and missing
//! input classify negatively instead of failing.
//!
//! # Example
//!
//! ```rust
//! use oc_ident::{identifier_type, is_slug, is_valid_id, IdentifierType};
//!
//! // base64("CorpusType:42")
//! assert!(is_valid_id("Q29ycHVzVHlwZTo0Mg=="));
//! assert!(is_slug("my-corpus"));
//! assert_eq!(identifier_type("42"), IdentifierType::Unknown);
//! ```

#![warn(missing_docs)]

pub mod classify;
pub mod error;
pub mod reference;

// Re-exports
pub use classify::{
    decode_global_id, identifier_type, is_slug, is_valid_id, DecodedGlobalId, IdClassifier,
    IdentifierType, ID_SCHEME_PREFIX, MIN_NUMERIC_ID_LEN,
};
pub use error::IdentError;
pub use reference::{
    create_safe_entity_reference, safe_extract_id, CanonicalId, CreatorRef, EntityExtras,
    EntityRef, HasId,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for identifier handling
    pub use crate::{
        create_safe_entity_reference, identifier_type, is_slug, is_valid_id, safe_extract_id,
        CanonicalId, CreatorRef, EntityRef, HasId, IdClassifier, IdentifierType,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
