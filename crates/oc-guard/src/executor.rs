//! Safe query executor
//!
//! Wraps an arbitrary async query function so that:
//! - the guard runs first and a blocked query never reaches the function
//! - a failing query is reported as a value instead of being propagated

use crate::guard::{guard_query, GuardConfig};
use crate::variables::QueryVariables;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::Future;

/// Result of a guarded execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafeQueryOutcome<R> {
    /// Query ran and succeeded
    Completed(R),
    /// Guard blocked the query; the function was not called
    Skipped {
        /// Joined guard findings
        error: String,
    },
    /// Query ran and failed
    Failed {
        /// Rendered failure
        error: String,
    },
}

impl<R> SafeQueryOutcome<R> {
    /// Whether the guard blocked the query
    #[inline]
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Successful payload
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&R> {
        match self {
            Self::Completed(data) => Some(data),
            _ => None,
        }
    }

    /// Consume into the successful payload
    #[inline]
    #[must_use]
    pub fn into_data(self) -> Option<R> {
        match self {
            Self::Completed(data) => Some(data),
            _ => None,
        }
    }

    /// Error message for skipped or failed queries
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Skipped { error } | Self::Failed { error } => Some(error),
        }
    }
}

/// Query function guarded by a [`GuardConfig`]
pub struct SafeQueryExecutor<V: QueryVariables, F> {
    query_fn: F,
    config: GuardConfig<V::Field>,
}

impl<V, F, Fut, R, E> SafeQueryExecutor<V, F>
where
    V: QueryVariables,
    F: Fn(V) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
{
    /// Guard `variables`, then run the query
    pub async fn execute(&self, variables: V) -> SafeQueryOutcome<R> {
        let guarded = guard_query(variables, &self.config);

        if !guarded.can_execute {
            let error = guarded
                .joined_errors()
                .unwrap_or_else(|| "query blocked by guard".to_string());
            return SafeQueryOutcome::Skipped { error };
        }

        match (self.query_fn)(guarded.variables).await {
            Ok(data) => SafeQueryOutcome::Completed(data),
            Err(e) => {
                tracing::warn!("Guarded query failed: {}", e);
                SafeQueryOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

impl<V: QueryVariables, F> SafeQueryExecutor<V, F> {
    /// Guard configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GuardConfig<V::Field> {
        &self.config
    }
}

impl<V: QueryVariables, F> Debug for SafeQueryExecutor<V, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeQueryExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Wrap `query_fn` so it only runs with guarded variables
pub fn create_safe_query_executor<V, F>(
    query_fn: F,
    config: GuardConfig<V::Field>,
) -> SafeQueryExecutor<V, F>
where
    V: QueryVariables,
{
    SafeQueryExecutor { query_fn, config }
}
