//! Statically typed query variables
//!
//! Every query gets its own variables struct and a field enum naming its
//! GraphQL variables, so a misspelled field name fails to compile. The guard
//! only needs read access to a field's value and the ability to default or
//! clear it, which is what [`QueryVariables`] exposes.
//!
//! [`VariableMap`] covers ad-hoc queries whose variables are only known at
//! runtime.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display, Formatter};

/// Value of a variable as seen by the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Not set or null
    Absent,
    /// String value (possibly empty)
    Text(&'a str),
    /// Non-string value (number, list, object, bool)
    Other,
}

impl<'a> FieldValue<'a> {
    /// Whether the value counts as missing (absent, null or empty string)
    #[inline]
    #[must_use]
    pub fn is_missing(self) -> bool {
        matches!(self, Self::Absent | Self::Text(""))
    }

    /// Text content, if any
    #[inline]
    #[must_use]
    pub fn as_text(self) -> Option<&'a str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Variables bag of a single query
pub trait QueryVariables: Clone {
    /// Field names of this query
    type Field: Clone + Eq + Debug + Display;

    /// Read a field
    fn field(&self, field: &Self::Field) -> FieldValue<'_>;

    /// Overwrite a field with a string value
    fn set_text(&mut self, field: &Self::Field, value: String);

    /// Remove a field
    fn clear(&mut self, field: &Self::Field);
}

/// Variables of queries keyed by a single corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusVariables {
    /// Corpus id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_id: Option<String>,
}

/// Fields of [`CorpusVariables`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorpusField {
    /// `corpusId`
    CorpusId,
}

impl CorpusVariables {
    /// Variables for a corpus
    #[inline]
    #[must_use]
    pub fn new(corpus_id: impl Into<String>) -> Self {
        Self {
            corpus_id: Some(corpus_id.into()),
        }
    }
}

impl Display for CorpusField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorpusId => f.write_str("corpusId"),
        }
    }
}

impl QueryVariables for CorpusVariables {
    type Field = CorpusField;

    fn field(&self, field: &CorpusField) -> FieldValue<'_> {
        match field {
            CorpusField::CorpusId => option_value(self.corpus_id.as_deref()),
        }
    }

    fn set_text(&mut self, field: &CorpusField, value: String) {
        match field {
            CorpusField::CorpusId => self.corpus_id = Some(value),
        }
    }

    fn clear(&mut self, field: &CorpusField) {
        match field {
            CorpusField::CorpusId => self.corpus_id = None,
        }
    }
}

/// Variables of queries keyed by a document, optionally within a corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVariables {
    /// Document id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Corpus id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_id: Option<String>,
}

/// Fields of [`DocumentVariables`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentField {
    /// `documentId`
    DocumentId,
    /// `corpusId`
    CorpusId,
}

impl DocumentVariables {
    /// Variables for a document
    #[inline]
    #[must_use]
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: Some(document_id.into()),
            corpus_id: None,
        }
    }

    /// With parent corpus id
    #[inline]
    #[must_use]
    pub fn with_corpus(mut self, corpus_id: impl Into<String>) -> Self {
        self.corpus_id = Some(corpus_id.into());
        self
    }
}

impl Display for DocumentField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentId => f.write_str("documentId"),
            Self::CorpusId => f.write_str("corpusId"),
        }
    }
}

impl QueryVariables for DocumentVariables {
    type Field = DocumentField;

    fn field(&self, field: &DocumentField) -> FieldValue<'_> {
        match field {
            DocumentField::DocumentId => option_value(self.document_id.as_deref()),
            DocumentField::CorpusId => option_value(self.corpus_id.as_deref()),
        }
    }

    fn set_text(&mut self, field: &DocumentField, value: String) {
        match field {
            DocumentField::DocumentId => self.document_id = Some(value),
            DocumentField::CorpusId => self.corpus_id = Some(value),
        }
    }

    fn clear(&mut self, field: &DocumentField) {
        match field {
            DocumentField::DocumentId => self.document_id = None,
            DocumentField::CorpusId => self.corpus_id = None,
        }
    }
}

/// Variables of the slug-resolution queries behind `/c/...` and `/d/...`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugRouteVariables {
    /// Creator slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_slug: Option<String>,
    /// Corpus slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_slug: Option<String>,
    /// Document slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_slug: Option<String>,
}

/// Fields of [`SlugRouteVariables`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlugRouteField {
    /// `userSlug`
    UserSlug,
    /// `corpusSlug`
    CorpusSlug,
    /// `documentSlug`
    DocumentSlug,
}

impl Display for SlugRouteField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserSlug => f.write_str("userSlug"),
            Self::CorpusSlug => f.write_str("corpusSlug"),
            Self::DocumentSlug => f.write_str("documentSlug"),
        }
    }
}

impl QueryVariables for SlugRouteVariables {
    type Field = SlugRouteField;

    fn field(&self, field: &SlugRouteField) -> FieldValue<'_> {
        let value = match field {
            SlugRouteField::UserSlug => &self.user_slug,
            SlugRouteField::CorpusSlug => &self.corpus_slug,
            SlugRouteField::DocumentSlug => &self.document_slug,
        };
        option_value(value.as_deref())
    }

    fn set_text(&mut self, field: &SlugRouteField, value: String) {
        *self.slot(field) = Some(value);
    }

    fn clear(&mut self, field: &SlugRouteField) {
        *self.slot(field) = None;
    }
}

impl SlugRouteVariables {
    fn slot(&mut self, field: &SlugRouteField) -> &mut Option<String> {
        match field {
            SlugRouteField::UserSlug => &mut self.user_slug,
            SlugRouteField::CorpusSlug => &mut self.corpus_slug,
            SlugRouteField::DocumentSlug => &mut self.document_slug,
        }
    }
}

/// Runtime-keyed variables, serialized as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableMap(BTreeMap<String, Value>);

impl VariableMap {
    /// Empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, builder style
    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether `name` is set
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl QueryVariables for VariableMap {
    type Field = String;

    fn field(&self, field: &String) -> FieldValue<'_> {
        match self.0.get(field) {
            None | Some(Value::Null) => FieldValue::Absent,
            Some(Value::String(s)) => FieldValue::Text(s),
            Some(_) => FieldValue::Other,
        }
    }

    fn set_text(&mut self, field: &String, value: String) {
        self.0.insert(field.clone(), Value::String(value));
    }

    fn clear(&mut self, field: &String) {
        self.0.remove(field);
    }
}

fn option_value(value: Option<&str>) -> FieldValue<'_> {
    value.map_or(FieldValue::Absent, FieldValue::Text)
}
