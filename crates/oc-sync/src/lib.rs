//! OC Route Synchronization
//!
//! Keeps the selection state (opened corpus, opened document, selected
//! annotations) in step with the browser location, and redirects to
//! canonical URLs once entities are loaded.
//!
//! # Architecture
//!
//! ```text
//! location ──▶ RouteSynchronizer ──▶ SelectionStore ◀── hydrate_*(entity)
//!                                          │
//!                                          ▼
//!                        canonicalize_current_route ──▶ Router::navigate
//! ```
//!
//! URL → state and state → URL are separate steps: the synchronizer never
//! navigates, and navigation helpers never write selection state.
//!
//! # Example
//!
//! ```rust
//! use oc_routes::Location;
//! use oc_sync::{RouteSynchronizer, SelectionStore};
//! use std::sync::Arc;
//!
//! let sync = RouteSynchronizer::new(Arc::new(SelectionStore::new()));
//! sync.on_location_change(&Location::parse("/corpus/ID1/document/ID2?ann=A,B"));
//! assert_eq!(sync.store().annotation_ids(), vec!["A", "B"]);
//! ```

#![warn(missing_docs)]

pub mod cell;
pub mod error;
pub mod navigate;
pub mod selection;
pub mod store;
pub mod sync;

// Re-exports
pub use cell::StateCell;
pub use error::SelectionError;
pub use navigate::{
    canonical_target, canonicalize_current_route, navigate_if_not_canonical, navigate_to_corpus,
    navigate_to_document, NavigateOptions, Router,
};
pub use selection::{allowed_transitions, validate_transition, Selection, SelectionPhase};
pub use store::{SelectionSnapshot, SelectionStore};
pub use sync::{sync_url_to_state, sync_url_to_state_with, RouteSynchronizer, SyncOutcome};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for route synchronization
    pub use crate::{
        canonicalize_current_route, navigate_if_not_canonical, navigate_to_corpus,
        navigate_to_document, NavigateOptions, RouteSynchronizer, Router, Selection,
        SelectionStore,
    };
}
