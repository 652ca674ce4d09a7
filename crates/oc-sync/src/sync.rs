//! URL → selection synchronization
//!
//! Reads the location and writes the selection store. Never writes back to
//! the URL; redirects live in [`crate::navigate`].

use crate::store::SelectionStore;
use oc_ident::IdClassifier;
use oc_routes::{parse_location_with, Location, Route, ANNOTATION_PARAM};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// What a sync pass changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Parsed route
    pub route: Route,
    /// Corpus cell changed
    pub corpus_changed: bool,
    /// Document cell changed
    pub document_changed: bool,
    /// Annotation cell changed
    pub annotations_changed: bool,
}

impl SyncOutcome {
    /// Whether any cell changed
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.corpus_changed || self.document_changed || self.annotations_changed
    }
}

/// Apply `location` to `store`
///
/// - document routes place the document (and its corpus, or clear the
///   corpus for standalone documents) and take annotation ids from the query
///   when the parameter is present
/// - corpus routes place the corpus and clear the document
/// - anything else clears the whole selection, annotations included
///
/// Selections that already stand for the parsed locators are left alone, so
/// hydrated entities survive a redirect to their canonical URL.
#[inline]
pub fn sync_url_to_state(
    location: &Location,
    store: &SelectionStore,
    annotation_param: &str,
) -> SyncOutcome {
    sync_url_to_state_with(location, store, annotation_param, IdClassifier::shared())
}

/// [`sync_url_to_state`] with an explicit identifier classifier
pub fn sync_url_to_state_with(
    location: &Location,
    store: &SelectionStore,
    annotation_param: &str,
    classifier: &IdClassifier,
) -> SyncOutcome {
    let parsed = parse_location_with(location, annotation_param, classifier);

    let (corpus_changed, document_changed) = match &parsed.route {
        Route::Document {
            corpus, document, ..
        } => {
            let corpus_changed = match corpus {
                Some(corpus) => store.place_corpus(corpus.clone()),
                None => store.clear_corpus(),
            };
            (corpus_changed, store.place_document(document.clone()))
        }
        Route::Corpus { corpus, .. } => {
            (store.place_corpus(corpus.clone()), store.clear_document())
        }
        Route::None => (store.clear_corpus(), store.clear_document()),
    };
    let annotations_changed = match (parsed.annotation_ids, &parsed.route) {
        (Some(ids), _) => store.set_annotation_ids(ids),
        (None, Route::None) => store.set_annotation_ids(Vec::new()),
        (None, _) => false,
    };

    let outcome = SyncOutcome {
        route: parsed.route,
        corpus_changed,
        document_changed,
        annotations_changed,
    };
    if outcome.changed() {
        tracing::debug!(
            "Synced {} (corpus: {}, document: {}, annotations: {})",
            location,
            corpus_changed,
            document_changed,
            annotations_changed
        );
    }
    outcome
}

/// Serializes sync passes and skips unchanged locations
///
/// Each pass runs to completion under a lock, so rapid location changes are
/// applied in arrival order.
#[derive(Debug)]
pub struct RouteSynchronizer {
    store: Arc<SelectionStore>,
    annotation_param: String,
    classifier: IdClassifier,
    last: Mutex<Option<Location>>,
}

impl RouteSynchronizer {
    /// Synchronizer writing to `store`
    #[must_use]
    pub fn new(store: Arc<SelectionStore>) -> Self {
        Self {
            store,
            annotation_param: ANNOTATION_PARAM.to_string(),
            classifier: IdClassifier::default(),
            last: Mutex::new(None),
        }
    }

    /// With custom annotation query parameter
    #[must_use]
    pub fn with_annotation_param(mut self, param: impl Into<String>) -> Self {
        self.annotation_param = param.into();
        self
    }

    /// With identifier classifier for slug-route segments
    #[must_use]
    pub fn with_classifier(mut self, classifier: IdClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Store written by this synchronizer
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<SelectionStore> {
        &self.store
    }

    /// Handle a location change
    ///
    /// Returns `None` when the location equals the last one processed.
    pub fn on_location_change(&self, location: &Location) -> Option<SyncOutcome> {
        let mut last = self.last.lock();
        if last.as_ref() == Some(location) {
            return None;
        }
        let outcome =
            sync_url_to_state_with(location, &self.store, &self.annotation_param, &self.classifier);
        *last = Some(location.clone());
        Some(outcome)
    }

    /// Forget the last location so the next change is processed
    pub fn invalidate(&self) {
        *self.last.lock() = None;
    }
}
