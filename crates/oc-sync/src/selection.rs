//! Per-entity selection state machine
//!
//! ```text
//!              URL match            hydration
//! Unselected ───────────▶ Placeholder ─────────▶ Hydrated
//!     ▲                     │    ▲                  │
//!     └──── URL no-match ───┘    └── new URL id ─┐  │
//!     ▲                          (Placeholder)   │  │
//!     └──────────────── URL no-match ────────────┴──┘
//! ```
//!
//! `Hydrated → Placeholder` is illegal; a hydrated entity must go back
//! through `Unselected` first.

use crate::error::SelectionError;
use oc_ident::EntityRef;
use oc_routes::EntityLocator;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Selection of one entity (the opened corpus or document)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    /// Nothing selected
    #[default]
    Unselected,
    /// Known from the URL, not loaded yet
    Placeholder {
        /// What the URL said
        locator: EntityLocator,
    },
    /// Loaded from the API
    Hydrated {
        /// Loaded reference
        entity: EntityRef,
    },
}

/// Phase of a [`Selection`], without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPhase {
    /// Nothing selected
    Unselected,
    /// Known from the URL
    Placeholder,
    /// Loaded
    Hydrated,
}

impl Display for SelectionPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unselected => "unselected",
            Self::Placeholder => "placeholder",
            Self::Hydrated => "hydrated",
        };
        f.write_str(name)
    }
}

impl Selection {
    /// Placeholder for `locator`
    #[inline]
    #[must_use]
    pub fn placeholder(locator: EntityLocator) -> Self {
        Self::Placeholder { locator }
    }

    /// Hydrated with `entity`
    #[inline]
    #[must_use]
    pub fn hydrated(entity: EntityRef) -> Self {
        Self::Hydrated { entity }
    }

    /// Phase of this selection
    #[inline]
    #[must_use]
    pub fn phase(&self) -> SelectionPhase {
        match self {
            Self::Unselected => SelectionPhase::Unselected,
            Self::Placeholder { .. } => SelectionPhase::Placeholder,
            Self::Hydrated { .. } => SelectionPhase::Hydrated,
        }
    }

    /// Loaded entity, if hydrated
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Hydrated { entity } => Some(entity),
            _ => None,
        }
    }

    /// URL locator, if still a placeholder
    #[inline]
    #[must_use]
    pub fn locator(&self) -> Option<&EntityLocator> {
        match self {
            Self::Placeholder { locator } => Some(locator),
            _ => None,
        }
    }

    /// Id known so far (placeholder id or hydrated id)
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::Placeholder { locator } => locator.as_id(),
            Self::Hydrated { entity } => Some(&entity.id),
        }
    }

    /// Whether this selection already stands for what `locator` points at
    #[must_use]
    pub fn satisfies(&self, locator: &EntityLocator) -> bool {
        match self {
            Self::Unselected => false,
            Self::Placeholder { locator: held } => held == locator,
            Self::Hydrated { entity } => locator.matches(entity),
        }
    }

    /// Whether nothing is selected
    #[inline]
    #[must_use]
    pub fn is_unselected(&self) -> bool {
        matches!(self, Self::Unselected)
    }
}

/// Validates a selection transition
///
/// `Hydrated → Hydrated` is a refresh and is only legal for the same id.
///
/// # Errors
/// [`SelectionError::IllegalTransition`] or [`SelectionError::IdentityChanged`].
pub fn validate_transition(from: &Selection, to: &Selection) -> Result<(), SelectionError> {
    if !allowed(from.phase(), to.phase()) {
        return Err(SelectionError::IllegalTransition {
            from: from.phase(),
            to: to.phase(),
        });
    }
    if let (Selection::Hydrated { entity: held }, Selection::Hydrated { entity: next }) = (from, to) {
        if held.id != next.id {
            return Err(SelectionError::IdentityChanged {
                held: held.id.clone(),
                next: next.id.clone(),
            });
        }
    }
    Ok(())
}

/// Phases reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: SelectionPhase) -> Vec<SelectionPhase> {
    use SelectionPhase::*;
    match from {
        Unselected => vec![Unselected, Placeholder],
        Placeholder => vec![Placeholder, Hydrated, Unselected],
        Hydrated => vec![Hydrated, Unselected],
    }
}

fn allowed(from: SelectionPhase, to: SelectionPhase) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> EntityRef {
        EntityRef::new("Q29ycHVzVHlwZTo0Mg==").with_slug("my-corpus")
    }

    #[test]
    fn hydrated_to_placeholder_is_illegal() {
        let result = validate_transition(
            &Selection::hydrated(corpus()),
            &Selection::placeholder(EntityLocator::id("other")),
        );
        assert_eq!(
            result,
            Err(SelectionError::IllegalTransition {
                from: SelectionPhase::Hydrated,
                to: SelectionPhase::Placeholder,
            })
        );
    }

    #[test]
    fn unselected_cannot_hydrate() {
        let result = validate_transition(&Selection::Unselected, &Selection::hydrated(corpus()));
        assert!(matches!(result, Err(SelectionError::IllegalTransition { .. })));
    }

    #[test]
    fn legal_path() {
        let placeholder = Selection::placeholder(EntityLocator::id(corpus().id));
        let hydrated = Selection::hydrated(corpus());

        assert!(validate_transition(&Selection::Unselected, &placeholder).is_ok());
        assert!(validate_transition(&placeholder, &hydrated).is_ok());
        assert!(validate_transition(&hydrated, &hydrated).is_ok());
        assert!(validate_transition(&hydrated, &Selection::Unselected).is_ok());
    }

    #[test]
    fn refresh_requires_same_id() {
        let result = validate_transition(
            &Selection::hydrated(corpus()),
            &Selection::hydrated(EntityRef::new("RG9jdW1lbnRUeXBlOjc=")),
        );
        assert!(matches!(result, Err(SelectionError::IdentityChanged { .. })));
    }

    #[test]
    fn satisfies_by_slug_when_hydrated() {
        let hydrated = Selection::hydrated(corpus());
        assert!(hydrated.satisfies(&EntityLocator::slug(None, "my-corpus")));
        assert!(hydrated.satisfies(&EntityLocator::id("Q29ycHVzVHlwZTo0Mg==")));
        assert!(!Selection::Unselected.satisfies(&EntityLocator::id("x")));
    }

    #[test]
    fn every_phase_can_reset() {
        for phase in [
            SelectionPhase::Unselected,
            SelectionPhase::Placeholder,
            SelectionPhase::Hydrated,
        ] {
            assert!(allowed_transitions(phase).contains(&SelectionPhase::Unselected));
        }
    }
}
