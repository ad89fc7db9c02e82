#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;

use mirage_core::error::{ProxyError, Result};
use mirage_core::membership::{CollectionMember, CollectionSummary, MembershipReader};
use mirage_core::options::ProxyOptions;
use mirage_core::upstream::{NativeView, RawResponse, UpstreamClient};
use mirage_model::{
    CatalogEntry, CollectionId, CollectionType, ItemKind, LocationType, MediaItem,
};
use mirage_server::{AppState, routes};

pub fn media_item(id: &str, name: &str, year: i32, rating: f32) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        name: name.to_string(),
        sort_name: None,
        kind: ItemKind::Movie,
        overview: None,
        date_created: Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single(),
        community_rating: Some(rating),
        production_year: Some(year),
        location_type: LocationType::FileSystem,
        image_url: None,
    }
}

pub fn native_view(id: &str, name: &str) -> NativeView {
    NativeView {
        id: id.to_string(),
        name: name.to_string(),
        collection_type: CollectionType::Movies,
    }
}

pub fn member_present(source_id: &str, upstream_id: &str) -> CollectionMember {
    CollectionMember {
        source_id: source_id.to_string(),
        upstream_id: Some(upstream_id.to_string()),
        catalog: CatalogEntry::default(),
    }
}

pub fn member_missing(source_id: &str, name: &str, year: i32) -> CollectionMember {
    CollectionMember {
        source_id: source_id.to_string(),
        upstream_id: None,
        catalog: CatalogEntry {
            name: name.to_string(),
            kind: ItemKind::Movie,
            production_year: Some(year),
            ..CatalogEntry::default()
        },
    }
}

/// In-memory upstream with call accounting. Batches are capped at two ids so
/// chunking is exercised by small fixtures.
#[derive(Default)]
pub struct StubUpstream {
    pub views: Vec<NativeView>,
    pub items: HashMap<String, MediaItem>,
    pub fail_ids: HashSet<String>,
    pub raw_responses: HashMap<String, RawResponse>,
    pub batch_delay: Option<Duration>,
    pub batch_calls: AtomicUsize,
    pub proxied: Mutex<Vec<String>>,
}

impl StubUpstream {
    pub fn with_views(mut self, views: Vec<NativeView>) -> Self {
        self.views = views;
        self
    }

    pub fn with_item(mut self, item: MediaItem) -> Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    pub fn with_failing_id(mut self, id: &str) -> Self {
        self.fail_ids.insert(id.to_string());
        self
    }

    pub fn with_raw(mut self, path_and_query: &str, response: RawResponse) -> Self {
        self.raw_responses
            .insert(path_and_query.to_string(), response);
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamClient for StubUpstream {
    async fn get_views(&self) -> Result<Vec<NativeView>> {
        Ok(self.views.clone())
    }

    async fn get_items_by_ids(&self, ids: &[String]) -> Result<Vec<MediaItem>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.batch_delay {
            tokio::time::sleep(delay).await;
        }
        if ids.iter().any(|id| self.fail_ids.contains(id)) {
            return Err(ProxyError::UpstreamUnavailable("stub batch failure".into()));
        }
        Ok(ids.iter().filter_map(|id| self.items.get(id).cloned()).collect())
    }

    async fn get_item(&self, id: &str) -> Result<MediaItem> {
        self.items
            .get(id)
            .cloned()
            .ok_or_else(|| ProxyError::NotFound(id.to_string()))
    }

    async fn proxy_raw(
        &self,
        path_and_query: &str,
        _headers: &[(String, String)],
    ) -> Result<RawResponse> {
        self.proxied.lock().await.push(path_and_query.to_string());
        self.raw_responses
            .get(path_and_query)
            .cloned()
            .ok_or_else(|| {
                ProxyError::UpstreamUnavailable(format!("no stubbed response for {path_and_query}"))
            })
    }

    fn max_ids_per_request(&self) -> usize {
        2
    }
}

/// In-memory collection store.
#[derive(Default)]
pub struct StubMembership {
    pub collections: Vec<CollectionSummary>,
    pub members: HashMap<CollectionId, Vec<CollectionMember>>,
}

impl StubMembership {
    pub fn with_collection(
        mut self,
        id: CollectionId,
        name: &str,
        members: Vec<CollectionMember>,
    ) -> Self {
        self.collections.push(CollectionSummary {
            id,
            name: name.to_string(),
            enabled: true,
        });
        self.members.insert(id, members);
        self
    }
}

#[async_trait]
impl MembershipReader for StubMembership {
    async fn list_collections(&self) -> Result<Vec<CollectionSummary>> {
        Ok(self.collections.clone())
    }

    async fn list_members(&self, collection: CollectionId) -> Result<Vec<CollectionMember>> {
        self.members
            .get(&collection)
            .cloned()
            .ok_or_else(|| ProxyError::NotFound(format!("collection {collection}")))
    }

    async fn lookup_catalog(&self, source_id: &str) -> Result<Option<CatalogEntry>> {
        for summary in &self.collections {
            if !summary.enabled {
                continue;
            }
            if let Some(members) = self.members.get(&summary.id)
                && let Some(member) = members.iter().find(|member| member.source_id == source_id)
            {
                return Ok(Some(member.catalog.clone()));
            }
        }
        Ok(None)
    }
}

pub fn test_server(
    upstream: Arc<StubUpstream>,
    membership: Arc<StubMembership>,
    options: ProxyOptions,
) -> TestServer {
    let state = AppState::new(options, upstream, membership);
    TestServer::new(routes::create_router(state)).expect("test server")
}
