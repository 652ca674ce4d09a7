//! Error types for selection state

use crate::selection::SelectionPhase;

/// Errors from selection transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Transition not permitted by the selection state machine
    #[error("illegal selection transition: {from} -> {to}")]
    IllegalTransition {
        /// Current phase
        from: SelectionPhase,
        /// Requested phase
        to: SelectionPhase,
    },

    /// Refresh attempted with a different entity
    #[error("hydrated selection '{held}' cannot be replaced by '{next}' without unselecting")]
    IdentityChanged {
        /// Id currently held
        held: String,
        /// Id offered
        next: String,
    },

    /// Hydrated entity is not the one the URL points at
    #[error("{entity} '{id}' does not match route locator {locator}")]
    LocatorMismatch {
        /// `corpus` or `document`
        entity: &'static str,
        /// Offered entity id
        id: String,
        /// Rendered locator
        locator: String,
    },
}

impl SelectionError {
    /// Whether the error came from a stale load
    ///
    /// A response arriving after the URL moved on is expected and harmless.
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::LocatorMismatch { .. } | Self::IllegalTransition { .. })
    }
}
