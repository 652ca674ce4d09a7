//! Route selection store
//!
//! Holds the opened corpus, the opened document and the selected annotation
//! ids. Written by the synchronizer and by hydration, read by everything
//! else. Each test or view tree can own an isolated store.

use crate::cell::StateCell;
use crate::error::SelectionError;
use crate::selection::{validate_transition, Selection};
use oc_ident::EntityRef;
use oc_routes::EntityLocator;
use serde::Serialize;
use std::convert::Infallible;

/// Point-in-time copy of the store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SelectionSnapshot {
    /// Opened corpus
    pub corpus: Selection,
    /// Opened document
    pub document: Selection,
    /// Selected annotation ids
    pub annotation_ids: Vec<String>,
}

/// Reactive selection state
#[derive(Debug, Default)]
pub struct SelectionStore {
    opened_corpus: StateCell<Selection>,
    opened_document: StateCell<Selection>,
    selected_annotation_ids: StateCell<Vec<String>>,
}

impl SelectionStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opened corpus cell
    #[inline]
    #[must_use]
    pub fn opened_corpus(&self) -> &StateCell<Selection> {
        &self.opened_corpus
    }

    /// Opened document cell
    #[inline]
    #[must_use]
    pub fn opened_document(&self) -> &StateCell<Selection> {
        &self.opened_document
    }

    /// Selected annotation ids cell
    #[inline]
    #[must_use]
    pub fn selected_annotation_ids(&self) -> &StateCell<Vec<String>> {
        &self.selected_annotation_ids
    }

    /// Current corpus selection
    #[must_use]
    pub fn corpus(&self) -> Selection {
        self.opened_corpus.get()
    }

    /// Current document selection
    #[must_use]
    pub fn document(&self) -> Selection {
        self.opened_document.get()
    }

    /// Current annotation ids
    #[must_use]
    pub fn annotation_ids(&self) -> Vec<String> {
        self.selected_annotation_ids.get()
    }

    /// Copy of every cell
    #[must_use]
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            corpus: self.corpus(),
            document: self.document(),
            annotation_ids: self.annotation_ids(),
        }
    }

    /// Point the corpus at `locator`
    ///
    /// No-op when the current selection already stands for the locator.
    /// Returns whether the cell changed.
    pub fn place_corpus(&self, locator: EntityLocator) -> bool {
        place(&self.opened_corpus, "corpus", locator)
    }

    /// Point the document at `locator`
    pub fn place_document(&self, locator: EntityLocator) -> bool {
        place(&self.opened_document, "document", locator)
    }

    /// Unselect the corpus
    pub fn clear_corpus(&self) -> bool {
        self.opened_corpus.set(Selection::Unselected)
    }

    /// Unselect the document
    pub fn clear_document(&self) -> bool {
        self.opened_document.set(Selection::Unselected)
    }

    /// Replace the selected annotation ids
    pub fn set_annotation_ids(&self, ids: Vec<String>) -> bool {
        self.selected_annotation_ids.set(ids)
    }

    /// Replace the corpus placeholder with the loaded entity
    ///
    /// # Errors
    /// Fails when no matching placeholder is held, e.g. a response that
    /// arrives after the URL moved on (see [`SelectionError::is_stale`]).
    pub fn hydrate_corpus(&self, corpus: EntityRef) -> Result<bool, SelectionError> {
        hydrate(&self.opened_corpus, "corpus", corpus)
    }

    /// Replace the document placeholder with the loaded entity
    ///
    /// # Errors
    /// As [`SelectionStore::hydrate_corpus`].
    pub fn hydrate_document(&self, document: EntityRef) -> Result<bool, SelectionError> {
        hydrate(&self.opened_document, "document", document)
    }

    /// Unselect everything
    pub fn reset(&self) {
        self.clear_document();
        self.clear_corpus();
        self.set_annotation_ids(Vec::new());
    }
}

fn place(cell: &StateCell<Selection>, entity: &'static str, locator: EntityLocator) -> bool {
    // Hydrated selections pass through Unselected; subscribers only see the result.
    let placed = cell.try_update::<Infallible>(|current| {
        if current.satisfies(&locator) {
            return Ok(None);
        }
        tracing::debug!("Selecting {} placeholder: {}", entity, locator);
        Ok(Some(Selection::placeholder(locator)))
    });
    matches!(placed, Ok(true))
}

fn hydrate(
    cell: &StateCell<Selection>,
    entity: &'static str,
    loaded: EntityRef,
) -> Result<bool, SelectionError> {
    cell.try_update(|current| {
        if let Selection::Placeholder { locator } = current {
            if !locator.matches(&loaded) {
                return Err(SelectionError::LocatorMismatch {
                    entity,
                    id: loaded.id.clone(),
                    locator: locator.to_string(),
                });
            }
        }
        let next = Selection::hydrated(loaded);
        validate_transition(current, &next)?;
        tracing::debug!("Hydrated {}: {}", entity, next.id().unwrap_or_default());
        Ok(Some(next))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionPhase;
    use oc_ident::CreatorRef;
    use pretty_assertions::assert_eq;

    const CORPUS_ID: &str = "Q29ycHVzVHlwZTo0Mg==";

    fn corpus() -> EntityRef {
        EntityRef::new(CORPUS_ID)
            .with_slug("my-corpus")
            .with_creator(CreatorRef::new("VXNlclR5cGU6Mw==").with_slug("john"))
    }

    #[test]
    fn place_then_hydrate() {
        let store = SelectionStore::new();
        assert!(store.place_corpus(EntityLocator::id(CORPUS_ID)));
        assert_eq!(store.corpus().phase(), SelectionPhase::Placeholder);

        assert_eq!(store.hydrate_corpus(corpus()), Ok(true));
        assert_eq!(store.corpus().entity(), Some(&corpus()));
    }

    #[test]
    fn placing_same_entity_again_is_noop() {
        let store = SelectionStore::new();
        store.place_corpus(EntityLocator::id(CORPUS_ID));
        assert!(!store.place_corpus(EntityLocator::id(CORPUS_ID)));

        store.hydrate_corpus(corpus()).unwrap();
        assert!(!store.place_corpus(EntityLocator::slug(Some("john"), "my-corpus")));
        assert_eq!(store.corpus().phase(), SelectionPhase::Hydrated);
    }

    #[test]
    fn placing_other_entity_resets_hydrated() {
        let store = SelectionStore::new();
        store.place_corpus(EntityLocator::id(CORPUS_ID));
        store.hydrate_corpus(corpus()).unwrap();

        assert!(store.place_corpus(EntityLocator::id("Q29ycHVzVHlwZTo0Mw==")));
        assert_eq!(
            store.corpus(),
            Selection::placeholder(EntityLocator::id("Q29ycHVzVHlwZTo0Mw=="))
        );
    }

    #[test]
    fn stale_hydration_is_rejected() {
        let store = SelectionStore::new();
        store.place_corpus(EntityLocator::id("Q29ycHVzVHlwZTo0Mw=="));

        let err = store.hydrate_corpus(corpus()).unwrap_err();
        assert!(err.is_stale());
        assert_eq!(store.corpus().phase(), SelectionPhase::Placeholder);
    }

    #[test]
    fn hydrate_without_placeholder_is_rejected() {
        let store = SelectionStore::new();
        assert!(matches!(
            store.hydrate_document(corpus()),
            Err(SelectionError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn reset_clears_everything() {
        let store = SelectionStore::new();
        store.place_corpus(EntityLocator::id(CORPUS_ID));
        store.place_document(EntityLocator::id("RG9jdW1lbnRUeXBlOjc="));
        store.set_annotation_ids(vec!["A".into()]);

        store.reset();
        assert_eq!(store.snapshot(), SelectionSnapshot::default());
    }

    #[tokio::test]
    async fn subscribers_observe_hydration() {
        let store = SelectionStore::new();
        let mut rx = store.opened_corpus().subscribe();

        store.place_corpus(EntityLocator::id(CORPUS_ID));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().phase(), SelectionPhase::Placeholder);

        store.hydrate_corpus(corpus()).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().phase(), SelectionPhase::Hydrated);
    }

    #[test]
    fn snapshot_serializes_tagged_selections() {
        let store = SelectionStore::new();
        store.place_corpus(EntityLocator::id(CORPUS_ID));
        store.set_annotation_ids(vec!["A".to_string()]);

        let value = serde_json::to_value(store.snapshot()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "corpus": {
                    "state": "placeholder",
                    "locator": { "kind": "id", "id": CORPUS_ID },
                },
                "document": { "state": "unselected" },
                "annotation_ids": ["A"],
            })
        );
    }
}
