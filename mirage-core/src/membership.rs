//! The external collection store, as consumed by the proxy core.
//!
//! Collection definitions and their computed membership are maintained by
//! the rule engine and its periodic refresh job; this layer only reads them.

use async_trait::async_trait;

use crate::error::Result;
use mirage_model::{CatalogEntry, CollectionId};

/// A configured collection as listed by the collection store.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSummary {
    pub id: CollectionId,
    pub name: String,
    pub enabled: bool,
}

/// One member of a collection: its external catalog identity, its upstream
/// presence (if any), and the locally cached display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMember {
    pub source_id: String,
    pub upstream_id: Option<String>,
    pub catalog: CatalogEntry,
}

impl CollectionMember {
    pub fn is_present(&self) -> bool {
        self.upstream_id.is_some()
    }
}

/// Read interface over the collection store.
///
/// Errors are scoped: a failed read affects only views over the collection
/// being read, never the rest of the merged surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipReader: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<CollectionSummary>>;

    /// Ordered member list of one collection.
    async fn list_members(&self, collection: CollectionId) -> Result<Vec<CollectionMember>>;

    /// Locally cached catalog metadata for a single member, looked up across
    /// enabled collections. `None` when no collection carries the id.
    async fn lookup_catalog(&self, source_id: &str) -> Result<Option<CatalogEntry>>;
}
