//! Entity loading
//!
//! Resolves route locators to entity references through guarded,
//! deduplicated GraphQL queries. A locator that cannot produce valid
//! variables never reaches the transport.

use oc_dedup::{build_request_key, RequestKey, RequestTracker};
use oc_guard::{
    run_guarded, CorpusField, CorpusVariables, DocumentField, DocumentVariables, GraphQlResponse,
    GuardConfig, QueryTransport, QueryVariables, SafeQueryOutcome, SlugRouteField,
    SlugRouteVariables,
};
use oc_ident::{EntityRef, IdClassifier};
use oc_routes::EntityLocator;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Corpus by id
pub const CORPUS_BY_ID_QUERY: &str =
    "query GetCorpus($corpusId: ID!) { corpus(id: $corpusId) { id slug creator { id slug } } }";

/// Corpus by creator and corpus slug
pub const CORPUS_BY_SLUGS_QUERY: &str = "query ResolveCorpus($userSlug: String!, $corpusSlug: String!) { \
     corpusBySlugs(userSlug: $userSlug, corpusSlug: $corpusSlug) { id slug creator { id slug } } }";

/// Document by id
pub const DOCUMENT_BY_ID_QUERY: &str = "query GetDocument($documentId: ID!, $corpusId: ID) { \
     document(id: $documentId, corpusId: $corpusId) { id slug creator { id slug } } }";

/// Standalone document by creator and document slug
pub const DOCUMENT_BY_SLUGS_QUERY: &str = "query ResolveDocument($userSlug: String!, $documentSlug: String!) { \
     documentBySlugs(userSlug: $userSlug, documentSlug: $documentSlug) { id slug creator { id slug } } }";

/// Document within a corpus by slugs
pub const DOCUMENT_IN_CORPUS_BY_SLUGS_QUERY: &str = "query ResolveDocumentInCorpus($userSlug: String!, \
     $corpusSlug: String!, $documentSlug: String!) { documentInCorpusBySlugs(userSlug: $userSlug, \
     corpusSlug: $corpusSlug, documentSlug: $documentSlug) { id slug creator { id slug } } }";

/// Loads corpora and documents for route locators
#[derive(Clone)]
pub struct EntityLoader {
    transport: Arc<dyn QueryTransport>,
    tracker: RequestTracker,
    classifier: IdClassifier,
}

enum Plan {
    ById {
        query: &'static str,
        root: &'static str,
        key: RequestKey,
        variables: IdVariables,
    },
    BySlugs {
        query: &'static str,
        root: &'static str,
        key: RequestKey,
        variables: SlugRouteVariables,
        required: Vec<SlugRouteField>,
    },
}

enum IdVariables {
    Corpus(CorpusVariables),
    Document(DocumentVariables),
}

impl EntityLoader {
    /// Loader over `transport`, sharing `tracker` for deduplication
    #[must_use]
    pub fn new(transport: Arc<dyn QueryTransport>, tracker: RequestTracker) -> Self {
        Self {
            transport,
            tracker,
            classifier: IdClassifier::default(),
        }
    }

    /// With the classifier the id guard checks against
    #[must_use]
    pub fn with_classifier(mut self, classifier: IdClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Resolve a corpus locator
    pub async fn load_corpus(&self, locator: &EntityLocator) -> SafeQueryOutcome<EntityRef> {
        let plan = match locator {
            EntityLocator::Id { id } => Plan::ById {
                query: CORPUS_BY_ID_QUERY,
                root: "corpus",
                key: build_request_key("corpus", [Some(id.as_str())]),
                variables: IdVariables::Corpus(CorpusVariables::new(id.clone())),
            },
            EntityLocator::Slug { creator, slug: value }
            | EntityLocator::Ambiguous { creator, value } => Plan::BySlugs {
                query: CORPUS_BY_SLUGS_QUERY,
                root: "corpusBySlugs",
                key: build_request_key("corpus-slugs", [creator.as_deref(), Some(value.as_str())]),
                variables: SlugRouteVariables {
                    user_slug: creator.clone(),
                    corpus_slug: Some(value.clone()),
                    document_slug: None,
                },
                required: vec![SlugRouteField::UserSlug, SlugRouteField::CorpusSlug],
            },
        };
        self.run(plan).await
    }

    /// Resolve a document locator, scoped to `corpus` when the route has one
    pub async fn load_document(
        &self,
        locator: &EntityLocator,
        corpus: Option<&EntityLocator>,
    ) -> SafeQueryOutcome<EntityRef> {
        let plan = match (locator, corpus) {
            (EntityLocator::Id { id }, corpus) => {
                let corpus_id = corpus.and_then(EntityLocator::as_id);
                let mut variables = DocumentVariables::new(id.clone());
                if let Some(corpus_id) = corpus_id {
                    variables = variables.with_corpus(corpus_id);
                }
                Plan::ById {
                    query: DOCUMENT_BY_ID_QUERY,
                    root: "document",
                    key: build_request_key("document", [Some(id.as_str()), corpus_id]),
                    variables: IdVariables::Document(variables),
                }
            }
            (
                EntityLocator::Slug { slug: value, .. } | EntityLocator::Ambiguous { value, .. },
                Some(EntityLocator::Slug { creator, slug: corpus_slug }),
            ) => Plan::BySlugs {
                query: DOCUMENT_IN_CORPUS_BY_SLUGS_QUERY,
                root: "documentInCorpusBySlugs",
                key: build_request_key(
                    "document-slugs",
                    [creator.as_deref(), Some(corpus_slug.as_str()), Some(value.as_str())],
                ),
                variables: SlugRouteVariables {
                    user_slug: creator.clone(),
                    corpus_slug: Some(corpus_slug.clone()),
                    document_slug: Some(value.clone()),
                },
                required: vec![
                    SlugRouteField::UserSlug,
                    SlugRouteField::CorpusSlug,
                    SlugRouteField::DocumentSlug,
                ],
            },
            (
                EntityLocator::Slug { creator, slug: value }
                | EntityLocator::Ambiguous { creator, value },
                _,
            ) => Plan::BySlugs {
                query: DOCUMENT_BY_SLUGS_QUERY,
                root: "documentBySlugs",
                key: build_request_key("document-slugs", [creator.as_deref(), Some(value.as_str())]),
                variables: SlugRouteVariables {
                    user_slug: creator.clone(),
                    corpus_slug: None,
                    document_slug: Some(value.clone()),
                },
                required: vec![SlugRouteField::UserSlug, SlugRouteField::DocumentSlug],
            },
        };
        self.run(plan).await
    }

    async fn run(&self, plan: Plan) -> SafeQueryOutcome<EntityRef> {
        let (key, root) = match &plan {
            Plan::ById { key, root, .. } | Plan::BySlugs { key, root, .. } => (key.clone(), *root),
        };
        let transport = Arc::clone(&self.transport);
        let classifier = self.classifier.clone();

        let tracked = self
            .tracker
            .track(key, move || async move {
                let transport = transport.as_ref();
                match plan {
                    Plan::ById {
                        query,
                        variables: IdVariables::Corpus(variables),
                        ..
                    } => {
                        let config = GuardConfig::new()
                            .with_required_fields([CorpusField::CorpusId])
                            .with_id_fields([CorpusField::CorpusId])
                            .with_classifier(classifier);
                        run_guarded(transport, query, variables, config).await
                    }
                    Plan::ById {
                        query,
                        variables: IdVariables::Document(variables),
                        ..
                    } => {
                        let config = GuardConfig::new()
                            .with_required_fields([DocumentField::DocumentId])
                            .with_id_fields([DocumentField::DocumentId, DocumentField::CorpusId])
                            .with_classifier(classifier);
                        run_guarded(transport, query, variables, config).await
                    }
                    Plan::BySlugs {
                        query,
                        variables,
                        required,
                        ..
                    } => {
                        // Slug queries have no id fields; a missing slug is still fatal.
                        if let Some(field) =
                            required.iter().find(|f| variables.field(f).is_missing())
                        {
                            return SafeQueryOutcome::Skipped {
                                error: format!("missing required field: {field}"),
                            };
                        }
                        let config = GuardConfig::new().with_required_fields(required);
                        run_guarded(transport, query, variables, config).await
                    }
                }
            })
            .await;

        match tracked {
            Ok(outcome) => extract_entity(outcome, root),
            Err(err) => SafeQueryOutcome::Failed {
                error: err.to_string(),
            },
        }
    }
}

fn extract_entity(
    outcome: SafeQueryOutcome<GraphQlResponse>,
    root: &str,
) -> SafeQueryOutcome<EntityRef> {
    match outcome {
        SafeQueryOutcome::Completed(response) => {
            let node = response
                .data
                .as_ref()
                .and_then(|data| data.get(root))
                .filter(|node| !node.is_null())
                .cloned();
            match node.map(serde_json::from_value::<EntityRef>) {
                Some(Ok(entity)) => SafeQueryOutcome::Completed(entity),
                Some(Err(err)) => SafeQueryOutcome::Failed {
                    error: format!("malformed {root} payload: {err}"),
                },
                None => SafeQueryOutcome::Failed {
                    error: format!("{root} not found"),
                },
            }
        }
        SafeQueryOutcome::Skipped { error } => SafeQueryOutcome::Skipped { error },
        SafeQueryOutcome::Failed { error } => SafeQueryOutcome::Failed { error },
    }
}

impl Debug for EntityLoader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityLoader")
            .field("tracker", &self.tracker)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}
