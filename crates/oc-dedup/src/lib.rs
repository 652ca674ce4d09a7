//! OC Request Deduplication
//!
//! Keeps at most one in-flight execution per semantic request key and shares
//! its result with every concurrent caller.
//!
//! # Architecture
//!
//! ```text
//! caller A ─┐                    ┌─ producer() (once) ─┐
//! caller B ─┼─ track(key, ..) ───┤                     ├─ settle → entry removed
//! caller C ─┘   (same key)       └─ Shared<future> ────┘
//! ```
//!
//! Entries are removed when their future settles, whatever the outcome, so
//! the next call with the same key starts fresh work. There is no
//! cancellation: a request nobody waits for any more stays registered until
//! someone polls it to completion.
//!
//! # Example
//!
//! ```rust
//! use oc_dedup::{RequestKey, RequestTracker};
//!
//! # async fn example() -> Result<(), oc_dedup::DedupError> {
//! let tracker = RequestTracker::new();
//! let key = RequestKey::new("corpus", [Some("u1"), Some("c1")]);
//!
//! let title: String = tracker
//!     .track(key, || async { "Contracts".to_string() })
//!     .await?;
//! assert_eq!(title, "Contracts");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod key;
pub mod tracker;

// Re-exports for convenience
pub use error::DedupError;
pub use key::{build_request_key, RequestKey};
pub use tracker::{RequestTracker, TrackerStats};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for request deduplication
    pub use crate::error::DedupError;
    pub use crate::key::{build_request_key, RequestKey};
    pub use crate::tracker::{RequestTracker, TrackerStats};
}
