//! State → URL navigation helpers
//!
//! Every helper compares the target with the current location first and only
//! calls the router when they differ, so a render at the canonical URL never
//! triggers another navigation.

use crate::selection::Selection;
use crate::store::SelectionStore;
use oc_ident::EntityRef;
use oc_routes::{Location, UrlBuilder};

/// Router navigation options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing
    pub replace: bool,
}

impl NavigateOptions {
    /// Push a new history entry
    pub const PUSH: Self = Self { replace: false };
    /// Replace the current history entry
    pub const REPLACE: Self = Self { replace: true };
}

/// Application router
#[cfg_attr(test, mockall::automock)]
pub trait Router: Send + Sync {
    /// Navigate to `path`
    fn navigate(&self, path: &str, options: NavigateOptions);
}

/// Navigate to `target` unless `current` already is it
///
/// Unresolved targets (`#...` or empty) are never navigated to. Returns
/// whether the router was called.
pub fn navigate_if_not_canonical(
    router: &dyn Router,
    current: &Location,
    target: &str,
    options: NavigateOptions,
) -> bool {
    if target.is_empty() || target.starts_with('#') {
        tracing::debug!("Skipping navigation to unresolved target from {}", current);
        return false;
    }
    if current.is_at(target) {
        return false;
    }
    tracing::info!("Navigating {} -> {} (replace: {})", current, target, options.replace);
    router.navigate(target, options);
    true
}

/// Open a corpus
pub fn navigate_to_corpus(
    router: &dyn Router,
    current: &Location,
    corpus: &EntityRef,
    urls: &UrlBuilder,
) -> bool {
    let target = urls.corpus_url(corpus);
    navigate_if_not_canonical(router, current, &target, NavigateOptions::PUSH)
}

/// Open a document, nested under `corpus` when given
pub fn navigate_to_document(
    router: &dyn Router,
    current: &Location,
    document: &EntityRef,
    corpus: Option<&EntityRef>,
    urls: &UrlBuilder,
) -> bool {
    let target = urls.document_url(document, corpus);
    navigate_if_not_canonical(router, current, &target, NavigateOptions::PUSH)
}

/// Canonical URL for the current selection
///
/// `None` while anything the URL names is still a placeholder, or when the
/// canonical URL cannot be built.
#[must_use]
pub fn canonical_target(store: &SelectionStore, urls: &UrlBuilder) -> Option<String> {
    let corpus = store.corpus();
    let target = match (&corpus, store.document()) {
        (_, Selection::Placeholder { .. }) | (Selection::Placeholder { .. }, _) => return None,
        (Selection::Hydrated { entity: corpus }, Selection::Hydrated { entity: document }) => {
            urls.document_url(&document, Some(corpus))
        }
        (Selection::Unselected, Selection::Hydrated { entity: document }) => {
            urls.document_url(&document, None)
        }
        (Selection::Hydrated { entity: corpus }, Selection::Unselected) => urls.corpus_url(corpus),
        (Selection::Unselected, Selection::Unselected) => return None,
    };
    (!urls.is_unresolved(&target)).then_some(target)
}

/// Redirect to the canonical URL once the selection is hydrated
///
/// Keeps the current query string and replaces the history entry.
pub fn canonicalize_current_route(
    router: &dyn Router,
    current: &Location,
    store: &SelectionStore,
    urls: &UrlBuilder,
) -> bool {
    let Some(target) = canonical_target(store, urls) else {
        return false;
    };
    let target = current.with_path(target).to_string();
    navigate_if_not_canonical(router, current, &target, NavigateOptions::REPLACE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::{always, eq};
    use oc_ident::CreatorRef;
    use oc_routes::EntityLocator;

    fn corpus() -> EntityRef {
        EntityRef::new("Q29ycHVzVHlwZTo0Mg==")
            .with_slug("my-corpus")
            .with_creator(CreatorRef::new("VXNlclR5cGU6Mw==").with_slug("john"))
    }

    fn document() -> EntityRef {
        EntityRef::new("RG9jdW1lbnRUeXBlOjc=")
            .with_slug("lease-2021")
            .with_creator(CreatorRef::new("VXNlclR5cGU6NA==").with_slug("jane"))
    }

    #[test]
    fn navigates_when_not_canonical() {
        let mut router = MockRouter::new();
        router
            .expect_navigate()
            .with(eq("/c/john/my-corpus"), eq(NavigateOptions::PUSH))
            .times(1)
            .return_const(());

        let current = Location::parse("/corpuses/Q29ycHVzVHlwZTo0Mg==");
        assert!(navigate_to_corpus(&router, &current, &corpus(), &UrlBuilder::new()));
    }

    #[test]
    fn no_navigation_at_canonical_path() {
        let mut router = MockRouter::new();
        router.expect_navigate().with(always(), always()).times(0);

        let current = Location::parse("/c/john/my-corpus/?ann=A");
        assert!(!navigate_to_corpus(&router, &current, &corpus(), &UrlBuilder::new()));
    }

    #[test]
    fn no_navigation_to_unresolved() {
        let mut router = MockRouter::new();
        router.expect_navigate().times(0);

        let current = Location::parse("/corpuses/x");
        let bare = EntityRef::new("Q29ycHVzVHlwZTo0Mg==");
        assert!(!navigate_to_corpus(&router, &current, &bare, &UrlBuilder::new()));
    }

    #[test]
    fn document_navigation_nests_under_corpus() {
        let mut router = MockRouter::new();
        router
            .expect_navigate()
            .with(eq("/d/john/my-corpus/lease-2021"), eq(NavigateOptions::PUSH))
            .times(1)
            .return_const(());

        let current = Location::parse("/c/john/my-corpus");
        assert!(navigate_to_document(
            &router,
            &current,
            &document(),
            Some(&corpus()),
            &UrlBuilder::new()
        ));
    }

    #[test]
    fn canonical_target_waits_for_hydration() {
        let store = SelectionStore::new();
        let urls = UrlBuilder::new();
        assert_eq!(canonical_target(&store, &urls), None);

        store.place_corpus(EntityLocator::id(corpus().id));
        assert_eq!(canonical_target(&store, &urls), None);

        store.hydrate_corpus(corpus()).unwrap();
        assert_eq!(canonical_target(&store, &urls).as_deref(), Some("/c/john/my-corpus"));

        store.place_document(EntityLocator::id(document().id));
        assert_eq!(canonical_target(&store, &urls), None);

        store.hydrate_document(document()).unwrap();
        assert_eq!(
            canonical_target(&store, &urls).as_deref(),
            Some("/d/john/my-corpus/lease-2021")
        );
    }

    #[test]
    fn canonicalize_preserves_query() {
        let store = SelectionStore::new();
        store.place_document(EntityLocator::id(document().id));
        store.hydrate_document(document()).unwrap();

        let mut router = MockRouter::new();
        router
            .expect_navigate()
            .with(eq("/d/jane/lease-2021?ann=A,B"), eq(NavigateOptions::REPLACE))
            .times(1)
            .return_const(());

        let current = Location::parse("/corpus/x/document/RG9jdW1lbnRUeXBlOjc=?ann=A,B");
        assert!(canonicalize_current_route(&router, &current, &store, &UrlBuilder::new()));
    }
}
