//! Query guard
//!
//! Validates a variables bag before it is handed to the transport.
//!
//! # Rules
//! 1. Missing required fields are recorded and defaulted to `""`; they do
//!    not block execution on their own.
//! 2. The first identifier field that is present but not a canonical id
//!    blocks execution and stops further checks.
//! 3. Absent or empty identifier fields pass, so callers can skip a query
//!    until the id is known.
//! 4. The error callback, when configured, runs once with every finding.

use crate::error::GuardError;
use crate::variables::{FieldValue, QueryVariables};
use oc_ident::{is_valid_id, HasId, IdClassifier};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Callback receiving all guard findings
pub type ErrorCallback = Arc<dyn Fn(&[GuardError]) + Send + Sync>;

/// Which fields of a query the guard checks
pub struct GuardConfig<F> {
    /// Fields that must be present (defaulted to `""` when missing)
    pub required_fields: Vec<F>,
    /// Fields that must carry canonical ids when present
    pub id_fields: Vec<F>,
    /// Optional finding reporter
    pub on_error: Option<ErrorCallback>,
    /// Classifier deciding what a canonical id is
    pub classifier: IdClassifier,
}

impl<F> GuardConfig<F> {
    /// Config checking nothing
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            required_fields: Vec::new(),
            id_fields: Vec::new(),
            on_error: None,
            classifier: IdClassifier::default(),
        }
    }

    /// With required fields
    #[inline]
    #[must_use]
    pub fn with_required_fields(mut self, fields: impl IntoIterator<Item = F>) -> Self {
        self.required_fields = fields.into_iter().collect();
        self
    }

    /// With identifier fields
    #[inline]
    #[must_use]
    pub fn with_id_fields(mut self, fields: impl IntoIterator<Item = F>) -> Self {
        self.id_fields = fields.into_iter().collect();
        self
    }

    /// With identifier classifier
    #[inline]
    #[must_use]
    pub fn with_classifier(mut self, classifier: IdClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// With error callback
    #[inline]
    #[must_use]
    pub fn with_on_error(mut self, callback: impl Fn(&[GuardError]) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl<F> Default for GuardConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Clone> Clone for GuardConfig<F> {
    fn clone(&self) -> Self {
        Self {
            required_fields: self.required_fields.clone(),
            id_fields: self.id_fields.clone(),
            on_error: self.on_error.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

impl<F: Debug> Debug for GuardConfig<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardConfig")
            .field("required_fields", &self.required_fields)
            .field("id_fields", &self.id_fields)
            .field("on_error", &self.on_error.is_some())
            .field("classifier", &self.classifier)
            .finish()
    }
}

/// Outcome of [`guard_query`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardResult<V> {
    /// Whether the query may be dispatched
    pub can_execute: bool,
    /// Variables with required fields defaulted
    pub variables: V,
    /// Every finding, blocking or not
    pub errors: Vec<GuardError>,
}

impl<V> GuardResult<V> {
    /// Rendered findings
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Findings joined into one message, if any
    #[must_use]
    pub fn joined_errors(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.error_messages().join("; "))
        }
    }
}

/// Validate `variables` against `config`
///
/// Never fails: a blocked query is reported through `can_execute`.
pub fn guard_query<V: QueryVariables>(
    mut variables: V,
    config: &GuardConfig<V::Field>,
) -> GuardResult<V> {
    let mut errors = Vec::new();

    for field in &config.required_fields {
        if variables.field(field).is_missing() {
            errors.push(GuardError::missing(field));
            variables.set_text(field, String::new());
        }
    }

    let mut can_execute = true;
    for field in &config.id_fields {
        let value = variables.field(field);
        let invalid = match value {
            FieldValue::Absent | FieldValue::Text("") => None,
            FieldValue::Text(s) if config.classifier.is_valid_id(s) => None,
            FieldValue::Text(s) => Some(s.to_string()),
            FieldValue::Other => Some("<non-string>".to_string()),
        };

        if let Some(value) = invalid {
            tracing::warn!("Blocking query: {} is not a canonical id ({})", field, value);
            errors.push(GuardError::invalid_id(field, value));
            can_execute = false;
            break;
        }
    }

    if !errors.is_empty() {
        if let Some(on_error) = &config.on_error {
            on_error(&errors);
        }
    }

    GuardResult {
        can_execute,
        variables,
        errors,
    }
}

/// Id extracted from a possibly missing entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedId {
    /// The id when valid
    pub id: Option<String>,
    /// Whether a valid id was found
    pub is_valid: bool,
}

/// Extract a canonical id from a corpus, document or any [`HasId`] value
#[must_use]
pub fn ensure_valid_entity_id<T: HasId + ?Sized>(entity: Option<&T>) -> ValidatedId {
    match oc_ident::safe_extract_id(entity) {
        Some(id) => ValidatedId {
            id: Some(id.to_string()),
            is_valid: true,
        },
        None => ValidatedId {
            id: None,
            is_valid: false,
        },
    }
}

/// Copy of `variables` with every listed field that is not a canonical id removed
///
/// Fields not listed in `id_fields` pass through unchanged.
#[must_use]
pub fn ensure_valid_id_variables<V: QueryVariables>(variables: &V, id_fields: &[V::Field]) -> V {
    let mut cleaned = variables.clone();
    for field in id_fields {
        let keep = match cleaned.field(field) {
            FieldValue::Absent => continue,
            FieldValue::Text(s) => is_valid_id(s),
            FieldValue::Other => false,
        };
        if !keep {
            tracing::debug!("Dropping invalid id variable {}", field);
            cleaned.clear(field);
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{
        CorpusField, CorpusVariables, DocumentField, DocumentVariables, SlugRouteField,
        SlugRouteVariables, VariableMap,
    };
    use oc_ident::EntityRef;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // base64("CorpusType:42"), base64("DocumentType:7")
    const CORPUS_42: &str = "Q29ycHVzVHlwZTo0Mg==";
    const DOCUMENT_7: &str = "RG9jdW1lbnRUeXBlOjc=";

    #[test]
    fn slug_in_id_field_blocks() {
        let config = GuardConfig::new().with_id_fields([CorpusField::CorpusId]);
        let result = guard_query(CorpusVariables::new("my-corpus-slug"), &config);

        assert!(!result.can_execute);
        assert_eq!(result.errors.len(), 1);
        assert!(result.error_messages()[0].contains("corpusId"));
    }

    #[test]
    fn encoded_id_passes() {
        let config = GuardConfig::new().with_id_fields([CorpusField::CorpusId]);
        let result = guard_query(CorpusVariables::new(CORPUS_42), &config);

        assert!(result.can_execute);
        assert!(result.errors.is_empty());
        assert_eq!(result.variables.corpus_id.as_deref(), Some(CORPUS_42));
    }

    #[test]
    fn configured_classifier_decides_ids() {
        let config = GuardConfig::new()
            .with_id_fields([CorpusField::CorpusId])
            .with_classifier(IdClassifier::new("urn:", 4));

        assert!(guard_query(CorpusVariables::new("urn:corpus:1"), &config).can_execute);
        assert!(!guard_query(CorpusVariables::new("my-corpus"), &config).can_execute);

        let default = GuardConfig::new().with_id_fields([CorpusField::CorpusId]);
        assert!(!guard_query(CorpusVariables::new("urn:corpus:1"), &default).can_execute);
    }

    #[test]
    fn absent_id_field_is_skip_not_error() {
        let config =
            GuardConfig::new().with_id_fields([DocumentField::DocumentId, DocumentField::CorpusId]);
        let result = guard_query(DocumentVariables::new(DOCUMENT_7), &config);

        assert!(result.can_execute);
        assert!(result.errors.is_empty());

        let empty = guard_query(CorpusVariables::new(""), &GuardConfig::new().with_id_fields([CorpusField::CorpusId]));
        assert!(empty.can_execute);
    }

    #[test]
    fn missing_required_fields_are_defaulted() {
        let config = GuardConfig::new()
            .with_required_fields([SlugRouteField::UserSlug, SlugRouteField::CorpusSlug]);
        let vars = SlugRouteVariables {
            user_slug: Some("john".to_string()),
            ..SlugRouteVariables::default()
        };
        let result = guard_query(vars, &config);

        assert!(result.can_execute);
        assert_eq!(result.errors, vec![GuardError::missing("corpusSlug")]);
        assert_eq!(result.variables.corpus_slug.as_deref(), Some(""));
        assert_eq!(result.variables.user_slug.as_deref(), Some("john"));
    }

    #[test]
    fn first_invalid_id_short_circuits() {
        let config = GuardConfig::new()
            .with_required_fields(["title".to_string()])
            .with_id_fields(["corpusId".to_string(), "documentId".to_string()]);
        let vars = VariableMap::new()
            .with("corpusId", "not an id")
            .with("documentId", "also-bad");
        let result = guard_query(vars, &config);

        assert!(!result.can_execute);
        // required default + first invalid id only
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[1].field(), "corpusId");
        assert_eq!(
            result.variables.get("title"),
            Some(&serde_json::Value::String(String::new()))
        );
    }

    #[test]
    fn non_string_id_blocks() {
        let config = GuardConfig::new().with_id_fields(["corpusId".to_string()]);
        let result = guard_query(VariableMap::new().with("corpusId", 42), &config);
        assert!(!result.can_execute);
    }

    #[test]
    fn on_error_called_once_with_all_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (calls_cb, seen_cb) = (calls.clone(), seen.clone());

        let config = GuardConfig::new()
            .with_required_fields([DocumentField::CorpusId])
            .with_id_fields([DocumentField::DocumentId])
            .with_on_error(move |errors| {
                calls_cb.fetch_add(1, Ordering::SeqCst);
                seen_cb.lock().unwrap().extend(errors.iter().cloned());
            });

        let result = guard_query(DocumentVariables::new("doc-slug"), &config);

        assert!(!result.can_execute);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), result.errors);
    }

    #[test]
    fn on_error_not_called_without_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_cb = calls.clone();
        let config = GuardConfig::new()
            .with_id_fields([CorpusField::CorpusId])
            .with_on_error(move |_| {
                calls_cb.fetch_add(1, Ordering::SeqCst);
            });

        let result = guard_query(CorpusVariables::new(CORPUS_42), &config);
        assert!(result.can_execute);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ensure_valid_entity_id_cases() {
        let valid = EntityRef::new(CORPUS_42);
        let slug = EntityRef::new("my-corpus");

        assert_eq!(
            ensure_valid_entity_id(Some(&valid)),
            ValidatedId {
                id: Some(CORPUS_42.to_string()),
                is_valid: true
            }
        );
        assert!(!ensure_valid_entity_id(Some(&slug)).is_valid);
        assert_eq!(
            ensure_valid_entity_id::<EntityRef>(None),
            ValidatedId {
                id: None,
                is_valid: false
            }
        );
    }

    #[test]
    fn ensure_valid_id_variables_removes_only_listed_invalid() {
        let vars = DocumentVariables::new("doc-slug").with_corpus("corpus-slug");
        let cleaned = ensure_valid_id_variables(&vars, &[DocumentField::DocumentId]);

        assert_eq!(cleaned.document_id, None);
        assert_eq!(cleaned.corpus_id.as_deref(), Some("corpus-slug"));

        let vars = DocumentVariables::new(DOCUMENT_7).with_corpus("corpus-slug");
        let cleaned =
            ensure_valid_id_variables(&vars, &[DocumentField::DocumentId, DocumentField::CorpusId]);
        assert_eq!(cleaned.document_id.as_deref(), Some(DOCUMENT_7));
        assert_eq!(cleaned.corpus_id, None);
    }
}
