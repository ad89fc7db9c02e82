//! Item hydration: resolving lightweight member references into full
//! displayable records.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::ProxyError;
use crate::upstream::UpstreamClient;
use mirage_model::{CatalogEntry, MediaItem};

/// A lightweight reference to a view member, before hydration.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemRef {
    /// Present upstream; resolved through a batched upstream fetch.
    Native { upstream_id: String },
    /// No upstream presence; synthesized locally under a virtual token.
    Placeholder {
        token: String,
        catalog: CatalogEntry,
    },
}

/// Result of one hydration pass.
///
/// Output order is unspecified; ordering belongs to the sort engine, which
/// receives the full candidate set.
#[derive(Debug, Default)]
pub struct Hydration {
    pub items: Vec<MediaItem>,
    pub attempted_chunks: usize,
    pub failed_chunks: usize,
}

impl Hydration {
    /// True when chunk failures left the result smaller than requested.
    pub fn degraded(&self) -> bool {
        self.failed_chunks > 0
    }
}

/// Resolves item references concurrently against the upstream server.
///
/// The semaphore is owned by the hydrator and shared across every in-flight
/// client request, so its width caps total concurrent upstream load no
/// matter how many virtual views fan out at once.
pub struct ItemHydrator {
    upstream: Arc<dyn UpstreamClient>,
    permits: Arc<Semaphore>,
    chunk_timeout: Duration,
}

impl fmt::Debug for ItemHydrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemHydrator")
            .field("available_permits", &self.permits.available_permits())
            .field("chunk_timeout", &self.chunk_timeout)
            .finish_non_exhaustive()
    }
}

impl ItemHydrator {
    pub fn new(upstream: Arc<dyn UpstreamClient>, width: usize, chunk_timeout: Duration) -> Self {
        Self {
            upstream,
            permits: Arc::new(Semaphore::new(width.max(1))),
            chunk_timeout,
        }
    }

    /// Resolve every reference that can be resolved.
    ///
    /// Native refs are chunked to the upstream batch ceiling and fetched
    /// under the permit pool, each chunk with its own timeout. A failing
    /// chunk is logged and its items excluded; the pass as a whole still
    /// returns everything that hydrated.
    pub async fn hydrate(&self, refs: Vec<ItemRef>) -> Hydration {
        let mut items = Vec::with_capacity(refs.len());
        let mut native_ids = Vec::new();
        for item_ref in refs {
            match item_ref {
                ItemRef::Native { upstream_id } => native_ids.push(upstream_id),
                ItemRef::Placeholder { token, catalog } => {
                    items.push(catalog.to_placeholder(token));
                }
            }
        }

        let chunk_size = self.upstream.max_ids_per_request().max(1);
        let mut fetches = FuturesUnordered::new();
        for chunk in native_ids.chunks(chunk_size) {
            let ids = chunk.to_vec();
            let upstream = Arc::clone(&self.upstream);
            let permits = Arc::clone(&self.permits);
            let chunk_timeout = self.chunk_timeout;
            fetches.push(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_closed) => {
                        return (
                            ids.len(),
                            Err(ProxyError::UpstreamUnavailable(
                                "hydration pool closed".to_string(),
                            )),
                        );
                    }
                };
                let result =
                    match tokio::time::timeout(chunk_timeout, upstream.get_items_by_ids(&ids))
                        .await
                    {
                        Ok(result) => result,
                        Err(_elapsed) => Err(ProxyError::UpstreamUnavailable(format!(
                            "batch of {} ids timed out after {chunk_timeout:?}",
                            ids.len()
                        ))),
                    };
                (ids.len(), result)
            });
        }

        let mut attempted_chunks = 0;
        let mut failed_chunks = 0;
        while let Some((chunk_len, result)) = fetches.next().await {
            attempted_chunks += 1;
            match result {
                Ok(batch) => items.extend(batch),
                Err(err) => {
                    failed_chunks += 1;
                    warn!("hydration chunk failed: ids={chunk_len} error={err}");
                }
            }
        }

        debug!(
            "hydration complete: items={} chunks={} failed={}",
            items.len(),
            attempted_chunks,
            failed_chunks
        );

        Hydration {
            items,
            attempted_chunks,
            failed_chunks,
        }
    }
}
