//! Navigation session
//!
//! Wires one selection store, its synchronizer, a router and the canonical
//! URL builder together:
//!
//! ```text
//! location change ─▶ sync ─▶ placeholders ─▶ resolve (guarded, deduplicated)
//!        ▲                                          │
//!        └──── Router::navigate(replace) ◀── hydrate + canonicalize
//! ```

use crate::config::NavConfig;
use crate::error::NavResult;
use crate::loader::EntityLoader;
use oc_dedup::RequestTracker;
use oc_guard::{QueryTransport, SafeQueryOutcome};
use oc_ident::{EntityRef, IdClassifier};
use oc_routes::{EntityLocator, Location, UrlBuilder};
use oc_sync::{
    canonicalize_current_route, RouteSynchronizer, Router, Selection, SelectionError,
    SelectionStore, SyncOutcome,
};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Outcome of resolving the current placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Entities hydrated this pass
    pub hydrated: usize,
    /// Loads skipped or failed, with their reasons
    pub unresolved: Vec<String>,
    /// Whether a canonical redirect was issued
    pub redirected: bool,
}

/// Selection state plus navigation for one view tree
pub struct NavSession {
    synchronizer: RouteSynchronizer,
    router: Arc<dyn Router>,
    urls: UrlBuilder,
    classifier: IdClassifier,
}

impl NavSession {
    /// Session with a fresh store
    #[must_use]
    pub fn new(config: &NavConfig, router: Arc<dyn Router>) -> Self {
        Self::with_store(config, router, Arc::new(SelectionStore::new()))
    }

    /// Session writing to an existing store
    #[must_use]
    pub fn with_store(config: &NavConfig, router: Arc<dyn Router>, store: Arc<SelectionStore>) -> Self {
        let classifier = config.classifier();
        Self {
            synchronizer: RouteSynchronizer::new(store)
                .with_annotation_param(config.annotation_param.clone())
                .with_classifier(classifier.clone()),
            router,
            urls: config.url_builder(),
            classifier,
        }
    }

    /// Loader over `transport` using this session's identifier classifier
    #[must_use]
    pub fn loader(&self, transport: Arc<dyn QueryTransport>, tracker: RequestTracker) -> EntityLoader {
        EntityLoader::new(transport, tracker).with_classifier(self.classifier.clone())
    }

    /// Selection store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<SelectionStore> {
        self.synchronizer.store()
    }

    /// URL builder
    #[inline]
    #[must_use]
    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    /// Handle a location change
    ///
    /// Syncs the store, then redirects if everything the URL names is
    /// already hydrated but the URL is not canonical. Returns `None` for an
    /// unchanged location.
    pub fn on_location_change(&self, location: &Location) -> Option<SyncOutcome> {
        let outcome = self.synchronizer.on_location_change(location)?;
        self.canonicalize(location);
        Some(outcome)
    }

    /// Store a loaded corpus and redirect to its canonical URL
    ///
    /// Returns whether a redirect was issued.
    ///
    /// # Errors
    /// [`SelectionError`] when the corpus is not the one the URL names.
    pub fn hydrate_corpus(&self, current: &Location, corpus: EntityRef) -> NavResult<bool> {
        self.store().hydrate_corpus(corpus)?;
        Ok(self.canonicalize(current))
    }

    /// Store a loaded document and redirect to its canonical URL
    ///
    /// # Errors
    /// As [`NavSession::hydrate_corpus`].
    pub fn hydrate_document(&self, current: &Location, document: EntityRef) -> NavResult<bool> {
        self.store().hydrate_document(document)?;
        Ok(self.canonicalize(current))
    }

    /// Redirect to the canonical URL of the current selection, if needed
    pub fn canonicalize(&self, current: &Location) -> bool {
        canonicalize_current_route(self.router.as_ref(), current, self.store(), &self.urls)
    }

    /// Load every placeholder through `loader`, hydrate, then canonicalize
    ///
    /// Stale responses (the URL moved on while loading) are dropped.
    ///
    /// # Errors
    /// Selection errors other than stale responses.
    pub async fn resolve(&self, current: &Location, loader: &EntityLoader) -> NavResult<ResolveReport> {
        let mut report = ResolveReport::default();
        let store = self.store();

        let corpus_locator = store.corpus().locator().cloned();
        let document_locator = store.document().locator().cloned();

        if let Some(locator) = &corpus_locator {
            let outcome = loader.load_corpus(locator).await;
            apply(&mut report, "corpus", outcome, |entity| store.hydrate_corpus(entity))?;
        }

        if let Some(locator) = &document_locator {
            let corpus_scope = match store.corpus() {
                Selection::Hydrated { entity } => Some(EntityLocator::id(entity.id)),
                Selection::Placeholder { locator } => Some(locator),
                Selection::Unselected => None,
            };
            let outcome = loader.load_document(locator, corpus_scope.as_ref()).await;
            apply(&mut report, "document", outcome, |entity| store.hydrate_document(entity))?;
        }

        report.redirected = self.canonicalize(current);
        Ok(report)
    }
}

fn apply(
    report: &mut ResolveReport,
    kind: &str,
    outcome: SafeQueryOutcome<EntityRef>,
    hydrate: impl FnOnce(EntityRef) -> Result<bool, SelectionError>,
) -> NavResult<()> {
    match outcome {
        SafeQueryOutcome::Completed(entity) => match hydrate(entity) {
            Ok(_) => report.hydrated += 1,
            Err(err) if err.is_stale() => {
                tracing::debug!("Dropping stale {} response: {}", kind, err);
                report.unresolved.push(format!("{kind}: {err}"));
            }
            Err(err) => return Err(err.into()),
        },
        SafeQueryOutcome::Skipped { error } | SafeQueryOutcome::Failed { error } => {
            tracing::warn!("Could not resolve {}: {}", kind, error);
            report.unresolved.push(format!("{kind}: {error}"));
        }
    }
    Ok(())
}

impl Debug for NavSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavSession")
            .field("synchronizer", &self.synchronizer)
            .field("urls", &self.urls)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}
