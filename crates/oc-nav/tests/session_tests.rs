use oc_nav::dedup::RequestTracker;
use oc_nav::routes::{EntityLocator, Location};
use oc_nav::sync::{NavigateOptions, Selection};
use oc_nav::{EntityLoader, NavConfig, NavSession};
use oc_test_utils::{
    corpus_id, document_id, encode_global_id, entity_response, sample_corpus, sample_document,
    RecordingRouter, StubTransport,
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;

fn session() -> (NavSession, Arc<RecordingRouter>) {
    let router = Arc::new(RecordingRouter::new());
    (NavSession::new(&NavConfig::default(), router.clone()), router)
}

fn loader(transport: StubTransport) -> EntityLoader {
    EntityLoader::new(Arc::new(transport), RequestTracker::default())
}

#[test]
fn legacy_corpus_url_redirects_once_after_hydration() {
    let (session, router) = session();
    let legacy = Location::parse(&format!("/corpuses/{}", corpus_id()));

    let outcome = session.on_location_change(&legacy).unwrap();
    assert!(outcome.corpus_changed);
    assert_eq!(router.count(), 0);

    assert!(session.hydrate_corpus(&legacy, sample_corpus()).unwrap());
    assert_eq!(
        router.calls(),
        vec![("/c/john/my-corpus".to_string(), NavigateOptions::REPLACE)]
    );

    // The router lands on the canonical path; nothing else happens.
    let canonical = Location::parse("/c/john/my-corpus");
    session.on_location_change(&canonical);
    assert_eq!(router.count(), 1);
    assert_eq!(session.store().corpus(), Selection::hydrated(sample_corpus()));
}

#[test]
fn canonical_url_never_redirects() {
    let (session, router) = session();
    let canonical = Location::parse("/c/john/my-corpus/");

    session.on_location_change(&canonical);
    session.hydrate_corpus(&canonical, sample_corpus()).unwrap();
    session.on_location_change(&canonical);

    assert_eq!(router.count(), 0);
}

#[test]
fn legacy_document_route_keeps_annotations() {
    let (session, router) = session();
    let legacy = Location::parse(&format!(
        "/corpus/{}/document/{}?ann=A,B",
        corpus_id(),
        document_id()
    ));

    session.on_location_change(&legacy);
    assert_eq!(session.store().annotation_ids(), vec!["A", "B"]);

    // Document first: still waiting on the corpus.
    assert!(!session.hydrate_document(&legacy, sample_document()).unwrap());
    assert!(session.hydrate_corpus(&legacy, sample_corpus()).unwrap());

    assert_eq!(
        router.last(),
        Some((
            "/d/john/my-corpus/lease-2021?ann=A,B".to_string(),
            NavigateOptions::REPLACE
        ))
    );
}

#[test]
fn hydrating_the_wrong_entity_is_rejected() {
    let (session, router) = session();
    let legacy = Location::parse(&format!("/corpuses/{}", corpus_id()));
    session.on_location_change(&legacy);

    let other = oc_nav::ident::EntityRef::new(encode_global_id("CorpusType", 99))
        .with_slug("other")
        .with_creator(oc_test_utils::john());
    let err = session.hydrate_corpus(&legacy, other).unwrap_err();

    assert!(matches!(err, oc_nav::NavError::Selection(ref e) if e.is_stale()));
    assert_eq!(router.count(), 0);
}

#[test]
fn leaving_for_an_unknown_route_clears_selection() {
    let (session, _router) = session();
    session.on_location_change(&Location::parse("/c/john/my-corpus"));
    session.on_location_change(&Location::parse("/settings"));

    assert!(session.store().corpus().is_unselected());
    assert!(session.store().document().is_unselected());
}

#[tokio::test]
async fn resolve_loads_hydrates_and_redirects() {
    let (session, router) = session();
    let legacy = Location::parse(&format!("/corpuses/{}", corpus_id()));
    session.on_location_change(&legacy);

    let transport = StubTransport::returning(entity_response("corpus", &sample_corpus()));
    let report = session.resolve(&legacy, &loader(transport)).await.unwrap();

    assert_eq!(report.hydrated, 1);
    assert!(report.unresolved.is_empty());
    assert!(report.redirected);
    assert_eq!(router.last().map(|(path, _)| path), Some("/c/john/my-corpus".to_string()));
}

#[tokio::test]
async fn resolve_document_in_corpus() {
    let (session, router) = session();
    let legacy = Location::parse(&format!(
        "/corpus/{}/document/{}",
        corpus_id(),
        document_id()
    ));
    session.on_location_change(&legacy);

    let mut data = entity_response("corpus", &sample_corpus());
    if let (Value::Object(data), Value::Object(document)) =
        (&mut data, entity_response("document", &sample_document()))
    {
        data.extend(document);
    }
    let transport = StubTransport::returning(data);
    let report = session.resolve(&legacy, &loader(transport)).await.unwrap();

    assert_eq!(report.hydrated, 2);
    assert_eq!(
        router.last().map(|(path, _)| path),
        Some("/d/john/my-corpus/lease-2021".to_string())
    );
}

#[tokio::test]
async fn stale_response_is_dropped() {
    let (session, router) = session();
    let legacy = Location::parse(&format!("/corpuses/{}", corpus_id()));
    session.on_location_change(&legacy);

    let other = oc_nav::ident::EntityRef::new(encode_global_id("CorpusType", 99))
        .with_slug("other")
        .with_creator(oc_test_utils::john());
    let transport = StubTransport::returning(entity_response("corpus", &other));
    let report = session.resolve(&legacy, &loader(transport)).await.unwrap();

    assert_eq!(report.hydrated, 0);
    assert_eq!(report.unresolved.len(), 1);
    assert!(!report.redirected);
    assert_eq!(router.count(), 0);
    assert_eq!(
        session.store().corpus().locator(),
        Some(&EntityLocator::id(corpus_id()))
    );
}

#[tokio::test]
async fn invalid_legacy_id_is_never_queried() {
    let (session, router) = session();
    let legacy = Location::parse("/corpuses/not-an-id");
    session.on_location_change(&legacy);

    let transport = Arc::new(StubTransport::returning(Value::Null));
    let loader = EntityLoader::new(transport.clone(), RequestTracker::default());
    let report = session.resolve(&legacy, &loader).await.unwrap();

    assert_eq!(transport.executions(), 0);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(router.count(), 0);
}

#[test]
fn annotations_persist_across_locations_without_the_param() {
    let (session, _router) = session();
    let path = format!("/corpus/{}/document/{}", corpus_id(), document_id());

    session.on_location_change(&Location::parse(&format!("{path}?ann=A,B")));
    let outcome = session.on_location_change(&Location::parse(&path)).unwrap();

    assert!(!outcome.annotations_changed);
    assert_eq!(session.store().annotation_ids(), vec!["A", "B"]);
}

#[tokio::test]
async fn configured_prefix_flows_to_sync_and_loader() {
    let router = Arc::new(RecordingRouter::new());
    let config = NavConfig::default().with_id_scheme_prefix("urn:");
    let session = NavSession::new(&config, router);
    let location = Location::parse("/c/john/urn:corpus:1");

    session.on_location_change(&location);
    assert_eq!(
        session.store().corpus().locator(),
        Some(&EntityLocator::id("urn:corpus:1"))
    );

    let transport = Arc::new(StubTransport::returning(entity_response("corpus", &sample_corpus())));
    let loader = session.loader(transport.clone(), RequestTracker::default());
    session.resolve(&location, &loader).await.unwrap();

    assert_eq!(transport.executions(), 1);
}
