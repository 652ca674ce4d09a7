//! OC navigation core (oc-nav)
//!
//! Keeps URL and selection state in sync for corpus and document views:
//! 1. **URL → State**: parse the location into placeholders
//! 2. **Resolve**: load placeholders through guarded, deduplicated queries
//! 3. **State → URL**: redirect to the canonical slug URL once hydrated
//!
//! # Quick Start
//!
//! ```rust
//! use oc_nav::prelude::*;
//! use std::sync::Arc;
//!
//! struct Noop;
//! impl Router for Noop {
//!     fn navigate(&self, _path: &str, _options: NavigateOptions) {}
//! }
//!
//! let session = NavSession::new(&NavConfig::default(), Arc::new(Noop));
//! let here = Location::parse("/corpuses/Q29ycHVzVHlwZTo0Mg==");
//! let outcome = session.on_location_change(&here).unwrap();
//! assert!(outcome.corpus_changed);
//! ```

// Facade modules
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod session;

// Building blocks
pub use oc_dedup as dedup;
pub use oc_guard as guard;
pub use oc_ident as ident;
pub use oc_routes as routes;
pub use oc_sync as sync;

// Re-exports
pub use config::{NavConfig, DEFAULT_GRAPHQL_ENDPOINT};
pub use error::{ConfigError, NavError, NavResult};
pub use loader::EntityLoader;
pub use session::{NavSession, ResolveReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Everything a view layer usually needs
    pub use crate::{EntityLoader, NavConfig, NavError, NavResult, NavSession};
    pub use oc_dedup::RequestTracker;
    pub use oc_guard::{HttpTransport, QueryTransport, SafeQueryOutcome};
    pub use oc_ident::{CreatorRef, EntityRef};
    pub use oc_routes::{EntityLocator, Location, Route, UrlBuilder};
    pub use oc_sync::{NavigateOptions, Router, Selection, SelectionStore};
}
