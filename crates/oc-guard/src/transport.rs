//! GraphQL transport seam
//!
//! The core only needs "run this query with these variables". The
//! [`QueryTransport`] trait is that seam; [`HttpTransport`] is a thin reqwest
//! adapter posting `{ query, variables }` as JSON.

use crate::error::TransportError;
use crate::executor::{create_safe_query_executor, SafeQueryOutcome};
use crate::guard::GuardConfig;
use crate::variables::QueryVariables;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// GraphQL response envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    /// Response data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Server-side errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQlError>>,
}

/// Single GraphQL error entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// Error message
    pub message: String,
    /// Path of the failing field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
}

impl GraphQlResponse {
    /// Response carrying data only
    #[inline]
    #[must_use]
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    /// Treat an error-only response as a failure
    ///
    /// Partial responses (data plus errors) are kept as successes.
    ///
    /// # Errors
    /// [`TransportError::GraphQl`] when there is no data and at least one error
    pub fn into_result(self) -> Result<Self, TransportError> {
        let error_only = matches!(self.data, None | Some(Value::Null))
            && self.errors.as_ref().is_some_and(|errors| !errors.is_empty());

        if error_only {
            let messages = self
                .errors
                .unwrap_or_default()
                .into_iter()
                .map(|e| e.message)
                .collect();
            return Err(TransportError::GraphQl(messages));
        }
        Ok(self)
    }
}

/// Executes GraphQL operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Run `query` with `variables`
    async fn execute(&self, query: &str, variables: Value) -> Result<GraphQlResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
    variables: Value,
}

impl HttpTransport {
    /// Transport posting to `endpoint`
    #[inline]
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Endpoint URL
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn execute(&self, query: &str, variables: Value) -> Result<GraphQlResponse, TransportError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&RequestBody { query, variables });

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.json::<GraphQlResponse>().await?;
        body.into_result()
    }
}

/// Guard `variables` and run `query` through `transport`
///
/// Blocked queries never reach the transport; transport and GraphQL failures
/// come back as [`SafeQueryOutcome::Failed`].
pub async fn run_guarded<V>(
    transport: &dyn QueryTransport,
    query: &str,
    variables: V,
    config: GuardConfig<V::Field>,
) -> SafeQueryOutcome<GraphQlResponse>
where
    V: QueryVariables + Serialize,
{
    let executor = create_safe_query_executor(
        |vars: V| async move {
            match serde_json::to_value(&vars) {
                Ok(variables) => transport.execute(query, variables).await,
                Err(e) => Err(TransportError::from(e)),
            }
        },
        config,
    );
    executor.execute(variables).await
}
