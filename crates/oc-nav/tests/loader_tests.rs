use oc_nav::dedup::RequestTracker;
use oc_nav::guard::{SafeQueryOutcome, TransportError};
use oc_nav::loader::{CORPUS_BY_SLUGS_QUERY, DOCUMENT_BY_ID_QUERY};
use oc_nav::routes::EntityLocator;
use oc_nav::EntityLoader;
use oc_test_utils::{corpus_id, document_id, entity_response, sample_corpus, sample_document, StubTransport};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn loader_over(transport: &Arc<StubTransport>) -> EntityLoader {
    EntityLoader::new(transport.clone(), RequestTracker::default())
}

#[tokio::test]
async fn concurrent_loads_share_one_request() {
    let transport = Arc::new(
        StubTransport::returning(entity_response("corpus", &sample_corpus()))
            .with_delay(Duration::from_millis(20)),
    );
    let loader = loader_over(&transport);
    let locator = EntityLocator::id(corpus_id());

    let (a, b) = tokio::join!(loader.load_corpus(&locator), loader.load_corpus(&locator));

    assert_eq!(a, SafeQueryOutcome::Completed(sample_corpus()));
    assert_eq!(a, b);
    assert_eq!(transport.executions(), 1);
}

#[tokio::test]
async fn sequential_loads_query_again() {
    let transport = Arc::new(StubTransport::returning(entity_response("corpus", &sample_corpus())));
    let loader = loader_over(&transport);
    let locator = EntityLocator::id(corpus_id());

    loader.load_corpus(&locator).await;
    loader.load_corpus(&locator).await;

    assert_eq!(transport.executions(), 2);
}

#[tokio::test]
async fn corpus_by_slugs() {
    let transport = Arc::new(StubTransport::returning(entity_response(
        "corpusBySlugs",
        &sample_corpus(),
    )));
    let loader = loader_over(&transport);

    let outcome = loader
        .load_corpus(&EntityLocator::slug(Some("john"), "my-corpus"))
        .await;

    assert_eq!(outcome, SafeQueryOutcome::Completed(sample_corpus()));
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, CORPUS_BY_SLUGS_QUERY);
}

#[tokio::test]
async fn slug_without_creator_is_skipped() {
    let transport = Arc::new(StubTransport::returning(json!({})));
    let loader = loader_over(&transport);

    let outcome = loader.load_corpus(&EntityLocator::slug(None, "my-corpus")).await;

    assert!(matches!(outcome, SafeQueryOutcome::Skipped { .. }));
    assert_eq!(transport.executions(), 0);
}

#[tokio::test]
async fn invalid_id_is_skipped() {
    let transport = Arc::new(StubTransport::returning(json!({})));
    let loader = loader_over(&transport);

    let outcome = loader.load_corpus(&EntityLocator::id("ID1")).await;

    assert!(matches!(outcome, SafeQueryOutcome::Skipped { .. }));
    assert_eq!(transport.executions(), 0);
}

#[tokio::test]
async fn document_by_id_scoped_to_corpus() {
    let transport = Arc::new(StubTransport::returning(entity_response(
        "document",
        &sample_document(),
    )));
    let loader = loader_over(&transport);

    let corpus = EntityLocator::id(corpus_id());
    let outcome = loader
        .load_document(&EntityLocator::id(document_id()), Some(&corpus))
        .await;

    assert_eq!(outcome, SafeQueryOutcome::Completed(sample_document()));
    assert_eq!(transport.requests()[0].0, DOCUMENT_BY_ID_QUERY);
}

#[tokio::test]
async fn missing_entity_fails() {
    let transport = Arc::new(StubTransport::returning(json!({ "corpus": null })));
    let loader = loader_over(&transport);

    let outcome = loader.load_corpus(&EntityLocator::id(corpus_id())).await;

    assert_eq!(
        outcome,
        SafeQueryOutcome::Failed {
            error: "corpus not found".to_string()
        }
    );
}

#[tokio::test]
async fn transport_failure_is_reported() {
    let transport = Arc::new(
        StubTransport::returning(json!({})).then(Err(TransportError::Other("down".into()))),
    );
    let loader = loader_over(&transport);

    let outcome = loader.load_corpus(&EntityLocator::id(corpus_id())).await;

    assert!(matches!(outcome, SafeQueryOutcome::Failed { .. }));
}
