//! The upstream media server, as consumed by the proxy core.
//!
//! Everything above this trait is protocol-agnostic; the reqwest-backed
//! implementation lives in [`http`].

pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use mirage_model::{CollectionType, MediaItem};

pub use http::{HttpUpstreamClient, UpstreamSettings};

/// A library exposed by the upstream server as-is. Sourced live on every
/// top-level view request; view lists are cheap and are not cached here.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NativeView {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub collection_type: CollectionType,
}

/// A verbatim upstream response for passthrough targets.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Client for the upstream media server's HTTP API.
///
/// Implementations must be safe to share across request tasks; the hydrator
/// fans out batched `get_items_by_ids` calls against one instance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// All libraries the upstream exposes.
    async fn get_views(&self) -> Result<Vec<NativeView>>;

    /// Fetch full item records for a batch of native ids. Ids unknown to the
    /// upstream are simply absent from the result.
    async fn get_items_by_ids(&self, ids: &[String]) -> Result<Vec<MediaItem>>;

    /// Fetch a single item by native id.
    async fn get_item(&self, id: &str) -> Result<MediaItem>;

    /// Forward a request verbatim and return the upstream response
    /// unmodified: status, protocol-relevant headers, and body.
    async fn proxy_raw(
        &self,
        path_and_query: &str,
        headers: &[(String, String)],
    ) -> Result<RawResponse>;

    /// The largest id batch a single `get_items_by_ids` call may carry.
    fn max_ids_per_request(&self) -> usize {
        50
    }
}
