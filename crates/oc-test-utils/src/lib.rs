//! Testing utilities for the OC navigation workspace
//!
//! Shared fixtures, a recording router and a scripted GraphQL transport.

#![allow(missing_docs)]

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use oc_guard::{GraphQlResponse, QueryTransport, TransportError};
use oc_ident::{CreatorRef, EntityRef};
use oc_sync::{NavigateOptions, Router};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Relay-style global id: base64("<type_name>:<pk>")
pub fn encode_global_id(type_name: &str, pk: u64) -> String {
    STANDARD.encode(format!("{type_name}:{pk}"))
}

pub fn corpus_id() -> String {
    encode_global_id("CorpusType", 42)
}

pub fn document_id() -> String {
    encode_global_id("DocumentType", 7)
}

pub fn user_id(pk: u64) -> String {
    encode_global_id("UserType", pk)
}

pub fn john() -> CreatorRef {
    CreatorRef::new(user_id(3)).with_slug("john")
}

/// Corpus `/c/john/my-corpus`
pub fn sample_corpus() -> EntityRef {
    EntityRef::new(corpus_id())
        .with_slug("my-corpus")
        .with_creator(john())
}

/// Document `lease-2021`, created by `jane`
pub fn sample_document() -> EntityRef {
    EntityRef::new(document_id())
        .with_slug("lease-2021")
        .with_creator(CreatorRef::new(user_id(4)).with_slug("jane"))
}

/// Corpus whose slug has not been assigned yet
pub fn corpus_without_slug() -> EntityRef {
    EntityRef::new(corpus_id()).with_creator(john())
}

/// GraphQL `data` payload with `entity` under `root`
pub fn entity_response(root: &str, entity: &EntityRef) -> Value {
    let node = serde_json::to_value(entity).unwrap_or(Value::Null);
    let mut data = serde_json::Map::new();
    data.insert(root.to_string(), node);
    Value::Object(data)
}

/// Router that records every navigation
#[derive(Debug, Default)]
pub struct RecordingRouter {
    calls: Mutex<Vec<(String, NavigateOptions)>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, NavigateOptions)> {
        self.calls.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last(&self) -> Option<(String, NavigateOptions)> {
        self.calls.lock().last().cloned()
    }
}

impl Router for RecordingRouter {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        self.calls.lock().push((path.to_string(), options));
    }
}

/// Transport replaying scripted responses
///
/// Once the script runs out, the fallback response is returned.
#[derive(Debug, Default)]
pub struct StubTransport {
    script: Mutex<VecDeque<Result<GraphQlResponse, TransportError>>>,
    fallback: GraphQlResponse,
    delay: Option<Duration>,
    requests: Mutex<Vec<(String, Value)>>,
    executions: AtomicUsize,
}

impl StubTransport {
    /// Transport answering every request with `data`
    pub fn returning(data: Value) -> Self {
        Self {
            fallback: GraphQlResponse::with_data(data),
            ..Self::default()
        }
    }

    /// Queue a one-off response
    pub fn then(self, response: Result<GraphQlResponse, TransportError>) -> Self {
        self.script.lock().push_back(response);
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl QueryTransport for StubTransport {
    async fn execute(&self, query: &str, variables: Value) -> Result<GraphQlResponse, TransportError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((query.to_string(), variables));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_canonical_ids() {
        assert!(oc_ident::is_valid_id(&corpus_id()));
        assert!(oc_ident::is_valid_id(&document_id()));
        assert_eq!(corpus_id(), "Q29ycHVzVHlwZTo0Mg==");
    }

    #[test]
    fn entity_response_nests_under_root() {
        let data = entity_response("corpus", &sample_corpus());
        assert_eq!(data["corpus"]["slug"], "my-corpus");
        assert_eq!(data["corpus"]["creator"]["slug"], "john");
    }

    #[test]
    fn recording_router_records() {
        let router = RecordingRouter::new();
        router.navigate("/c/john/my-corpus", NavigateOptions::REPLACE);
        assert_eq!(router.count(), 1);
        assert_eq!(
            router.last(),
            Some(("/c/john/my-corpus".to_string(), NavigateOptions::REPLACE))
        );
    }

    #[tokio::test]
    async fn stub_transport_replays_script() {
        let transport = StubTransport::returning(serde_json::json!({"ok": true}))
            .then(Err(TransportError::Other("down".into())));

        assert!(transport.execute("q", Value::Null).await.is_err());
        let second = transport.execute("q", Value::Null).await.unwrap();
        assert_eq!(second.data, Some(serde_json::json!({"ok": true})));
        assert_eq!(transport.executions(), 2);
    }
}
