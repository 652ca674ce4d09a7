//! In-flight request tracker
//!
//! Registry of running requests keyed by [`RequestKey`]. Results are stored
//! type-erased so a single registry serves every request type, and are
//! downcast back for each caller.

use crate::error::DedupError;
use crate::key::RequestKey;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use once_cell::sync::Lazy;
use std::any::{type_name, Any};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type SharedResult = Shared<BoxFuture<'static, Arc<dyn Any + Send + Sync>>>;

static GLOBAL_TRACKER: Lazy<RequestTracker> = Lazy::new(RequestTracker::new);

/// Counters for tracker monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Producer invocations registered
    pub started: u64,
    /// Calls that joined an existing request
    pub deduplicated: u64,
    /// Requests currently in flight
    pub in_flight: u64,
}

struct InFlight {
    generation: u64,
    type_name: &'static str,
    future: SharedResult,
}

struct Registry {
    in_flight: DashMap<RequestKey, InFlight>,
    next_generation: AtomicU64,
    started: AtomicU64,
    deduplicated: AtomicU64,
}

/// Deduplicating request tracker
///
/// Cloning is cheap; clones share the same registry. Tests build their own
/// instance, application code may use [`RequestTracker::global`].
#[derive(Clone)]
pub struct RequestTracker {
    registry: Arc<Registry>,
}

impl RequestTracker {
    /// Create an empty tracker
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                in_flight: DashMap::new(),
                next_generation: AtomicU64::new(0),
                started: AtomicU64::new(0),
                deduplicated: AtomicU64::new(0),
            }),
        }
    }

    /// Process-wide tracker
    #[inline]
    #[must_use]
    pub fn global() -> &'static RequestTracker {
        &GLOBAL_TRACKER
    }

    /// Run `producer` unless a request with `key` is already in flight
    ///
    /// Concurrent callers with the same key share one producer invocation and
    /// observe the same value. Once that value is produced the entry is
    /// removed, so the next call with the key invokes its producer again.
    /// Failures are ordinary values here: use a `Result` as `T` and they are
    /// shared just like successes. A panicking producer also releases the
    /// key before the panic reaches the callers.
    ///
    /// The producer runs on first poll, outside the registry lock, so it may
    /// itself track other requests.
    ///
    /// # Errors
    /// [`DedupError::TypeMismatch`] if the in-flight request for `key`
    /// produces a different type than `T`.
    pub async fn track<T, F, Fut>(&self, key: RequestKey, producer: F) -> Result<T, DedupError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (future, actual) = match self.registry.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                self.registry.deduplicated.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Joining in-flight request: {}", key);
                (entry.get().future.clone(), entry.get().type_name)
            }
            Entry::Vacant(entry) => {
                let generation = self.registry.next_generation.fetch_add(1, Ordering::Relaxed);
                self.registry.started.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Starting request: {}", key);

                let future = settle_and_remove::<T, F, Fut>(
                    Arc::downgrade(&self.registry),
                    key.clone(),
                    generation,
                    producer,
                );
                entry.insert(InFlight {
                    generation,
                    type_name: type_name::<T>(),
                    future: future.clone(),
                });
                (future, type_name::<T>())
            }
        };

        let value = future.await;
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| DedupError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                actual,
            })
    }

    /// Whether a request with `key` is in flight
    #[inline]
    #[must_use]
    pub fn is_pending(&self, key: &RequestKey) -> bool {
        self.registry.in_flight.contains_key(key)
    }

    /// Number of requests in flight
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.registry.in_flight.len()
    }

    /// Get tracker statistics
    #[must_use]
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            started: self.registry.started.load(Ordering::Relaxed),
            deduplicated: self.registry.deduplicated.load(Ordering::Relaxed),
            in_flight: self.registry.in_flight.len() as u64,
        }
    }
}

/// Wrap `producer` so its entry is removed once it settles or panics
fn settle_and_remove<T, F, Fut>(
    registry: Weak<Registry>,
    key: RequestKey,
    generation: u64,
    producer: F,
) -> SharedResult
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    async move {
        let settled = AssertUnwindSafe(async move { producer().await })
            .catch_unwind()
            .await;
        if let Some(registry) = registry.upgrade() {
            registry
                .in_flight
                .remove_if(&key, |_, entry| entry.generation == generation);
        }
        match settled {
            Ok(value) => {
                tracing::debug!("Request settled: {}", key);
                Arc::new(value) as Arc<dyn Any + Send + Sync>
            }
            Err(payload) => {
                tracing::warn!("Request panicked: {}", key);
                panic::resume_unwind(payload)
            }
        }
    }
    .boxed()
    .shared()
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for RequestTracker {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTracker")
            .field("stats", &self.stats())
            .finish()
    }
}
