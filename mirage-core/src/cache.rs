//! TTL-bounded cache of materialized view sets with a single-flight rebuild
//! guarantee.
//!
//! A popular virtual view receives many simultaneous page requests from a
//! single client's paging UI; all of them must share one materialization.
//! The page window is deliberately not part of the key; every window of the
//! same query slices one cached, fully sorted set.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::ProxyError;
use mirage_model::{CollectionId, ItemFilter, MediaItem, SortSpec};

/// Normalized signature of the sort/filter portion of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuerySignature([u8; 32]);

impl QuerySignature {
    fn from_parts(sort: &SortSpec, filters: &[ItemFilter]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(sort.field.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(sort.order.as_str().as_bytes());
        for filter in filters {
            hasher.update([0u8]);
            hasher.update(filter.as_str().as_bytes());
        }
        Self(hasher.finalize().into())
    }
}

/// Cache key: one materialized set per collection and query signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub collection: CollectionId,
    signature: QuerySignature,
}

impl ViewKey {
    /// Filters must be pre-normalized (sorted, deduplicated) so equivalent
    /// requests land on the same key.
    pub fn new(collection: CollectionId, sort: &SortSpec, filters: &[ItemFilter]) -> Self {
        Self {
            collection,
            signature: QuerySignature::from_parts(sort, filters),
        }
    }
}

/// A materialized, filtered, fully sorted candidate set.
#[derive(Debug)]
pub struct CachedSet {
    pub items: Vec<MediaItem>,
    pub built_at: Instant,
    /// True when chunk failures left the set smaller than membership says.
    pub degraded: bool,
}

impl CachedSet {
    pub fn new(items: Vec<MediaItem>, degraded: bool) -> Self {
        Self {
            items,
            built_at: Instant::now(),
            degraded,
        }
    }
}

type BuildResult = std::result::Result<Arc<CachedSet>, Arc<ProxyError>>;

#[derive(Default)]
struct Flight {
    notify: Notify,
    result: Mutex<Option<BuildResult>>,
}

/// The only mutable shared state in the proxy core. All mutation goes
/// through [`ViewCache::get_or_build`] and [`ViewCache::invalidate`], both
/// safe under concurrent invocation for the same key and for different keys.
#[derive(Default)]
pub struct ViewCache {
    entries: DashMap<ViewKey, Arc<CachedSet>>,
    flights: Mutex<HashMap<ViewKey, Arc<Flight>>>,
}

impl fmt::Debug for ViewCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCache")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&self, key: &ViewKey, ttl: Duration) -> Option<Arc<CachedSet>> {
        let entry = self.entries.get(key)?;
        if entry.built_at.elapsed() < ttl {
            Some(Arc::clone(entry.value()))
        } else {
            // Lazy expiry-on-read; the entry is replaced by the next build.
            None
        }
    }

    /// The entry for `key` regardless of TTL. Deadline fallback: a stale
    /// page beats an empty error response when the rebuild overruns.
    pub fn peek(&self, key: &ViewKey) -> Option<Arc<CachedSet>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Return the fresh entry for `key`, or build it.
    ///
    /// At most one build per key is in flight at any time: concurrent
    /// callers await the leader and receive its result, success or the same
    /// failure. A failed build is not stored, so the next call after
    /// completion starts a fresh attempt.
    pub async fn get_or_build<F, Fut>(&self, key: ViewKey, ttl: Duration, build: F) -> BuildResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::error::Result<CachedSet>>,
    {
        if let Some(set) = self.fresh(&key, ttl) {
            return Ok(set);
        }

        let (is_leader, flight) = {
            let mut flights = self.flights.lock().await;
            // A leader may have completed while we waited on the lock.
            if let Some(set) = self.fresh(&key, ttl) {
                return Ok(set);
            }
            match flights.get(&key) {
                Some(flight) => (false, Arc::clone(flight)),
                None => {
                    let flight = Arc::new(Flight::default());
                    flights.insert(key.clone(), Arc::clone(&flight));
                    (true, flight)
                }
            }
        };

        if !is_leader {
            let notified = flight.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(result) = flight.result.lock().await.clone() {
                return result;
            }
            notified.await;
            let result = flight.result.lock().await.clone();
            return result.unwrap_or_else(|| {
                Err(Arc::new(ProxyError::CacheBuild(
                    "in-flight build finished without a result".to_string(),
                )))
            });
        }

        let result: BuildResult = match build().await {
            Ok(set) => {
                let set = Arc::new(set);
                self.entries.insert(key.clone(), Arc::clone(&set));
                debug!(
                    "view cache rebuilt: collection={} items={} degraded={}",
                    key.collection,
                    set.items.len(),
                    set.degraded
                );
                Ok(set)
            }
            Err(err) => Err(Arc::new(err)),
        };

        *flight.result.lock().await = Some(result.clone());
        self.flights.lock().await.remove(&key);
        flight.notify.notify_waiters();
        result
    }

    /// Drop every cached signature for a collection. Called by the external
    /// membership-refresh job after it rewrites the collection.
    pub fn invalidate(&self, collection: CollectionId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.collection != collection);
        let removed = before - self.entries.len();
        if removed > 0 {
            info!(
                "view cache invalidated: collection={} entries={}",
                collection, removed
            );
        }
        removed
    }
}
