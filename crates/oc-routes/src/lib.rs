//! OC Routes
//!
//! Canonical, slug-based URLs for corpora and documents, the route shapes the
//! application understands, and the path equivalence used to avoid redirect
//! loops.
//!
//! # Overview
//!
//! - **UrlBuilder / get_entity_url**: slug URLs with a `#` fallback
//! - **parse_route / parse_location**: ordered route-shape matching
//! - **is_canonical_path**: equality ignoring query and trailing slashes
//!
//! # Example
//!
//! ```rust
//! use oc_routes::{is_canonical_path, parse_route, RouteShape};
//!
//! assert_eq!(parse_route("/c/john/my-corpus").shape(), Some(RouteShape::Corpus));
//! assert!(is_canonical_path("/c/john/my-corpus/?ann=A", "/c/john/my-corpus"));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod locator;
pub mod path;
pub mod route;
pub mod url;

// Re-exports
pub use error::RouteError;
pub use locator::EntityLocator;
pub use path::{
    is_canonical_path, normalize_path, parse_annotation_ids, with_annotation_query, Location,
    ANNOTATION_PARAM,
};
pub use route::{
    parse_location, parse_location_with, parse_route, parse_route_with, ParsedLocation, Route,
    RouteShape,
};
pub use url::{
    get_corpus_url, get_document_url, get_entity_url, try_entity_url, RouteTemplate, UrlBuilder,
    UNRESOLVED_URL,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for routing
    pub use crate::{
        get_entity_url, is_canonical_path, parse_location, parse_route, EntityLocator, Location,
        Route, RouteShape, RouteTemplate, UrlBuilder,
    };
}
