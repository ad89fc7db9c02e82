//! File-backed collection store reader.
//!
//! The external rule engine's refresh job writes the collection store as a
//! JSON document and then calls the cache invalidation endpoint. The reader
//! re-reads the document on demand, so refreshed membership becomes visible
//! on the next cache rebuild without any coordination beyond the file write.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use mirage_core::error::{ProxyError, Result};
use mirage_core::membership::{CollectionMember, CollectionSummary, MembershipReader};
use mirage_model::{CatalogEntry, CollectionId, ItemKind};

#[derive(Debug, Default, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    collections: Vec<StoreCollection>,
}

#[derive(Debug, Deserialize)]
struct StoreCollection {
    id: CollectionId,
    name: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    members: Vec<StoreMember>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct StoreMember {
    source_id: String,
    #[serde(default)]
    upstream_id: Option<String>,
    #[serde(default)]
    catalog: StoreCatalog,
}

#[derive(Debug, Default, Deserialize)]
struct StoreCatalog {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sort_name: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    community_rating: Option<f32>,
    #[serde(default)]
    production_year: Option<i32>,
    #[serde(default)]
    image_url: Option<String>,
}

impl StoreMember {
    fn into_member(self) -> CollectionMember {
        let catalog = CatalogEntry {
            // A member without display metadata still needs a name clients
            // can render; fall back to the catalog id.
            name: self
                .catalog
                .name
                .unwrap_or_else(|| self.source_id.clone()),
            sort_name: self.catalog.sort_name,
            kind: self
                .catalog
                .kind
                .as_deref()
                .map(parse_kind)
                .unwrap_or_default(),
            overview: self.catalog.overview,
            added_at: self.catalog.added_at,
            community_rating: self.catalog.community_rating,
            production_year: self.catalog.production_year,
            image_url: self.catalog.image_url,
        };
        CollectionMember {
            source_id: self.source_id,
            upstream_id: self.upstream_id,
            catalog,
        }
    }
}

fn parse_kind(raw: &str) -> ItemKind {
    match raw.to_lowercase().as_str() {
        "movie" => ItemKind::Movie,
        "series" => ItemKind::Series,
        "episode" => ItemKind::Episode,
        "boxset" => ItemKind::BoxSet,
        _ => ItemKind::Unknown,
    }
}

/// [`MembershipReader`] over the refresh job's JSON document.
///
/// With no path configured the store is empty: no virtual views, every
/// request passes through.
#[derive(Debug, Clone)]
pub struct FileMembershipReader {
    path: Option<PathBuf>,
}

impl FileMembershipReader {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    async fn load(&self) -> Result<StoreDocument> {
        let Some(path) = &self.path else {
            return Ok(StoreDocument::default());
        };
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ProxyError::MembershipRead(format!("{}: {err}", path.display()))
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|err| ProxyError::MembershipRead(format!("{}: {err}", path.display())))
    }
}

#[async_trait]
impl MembershipReader for FileMembershipReader {
    async fn list_collections(&self) -> Result<Vec<CollectionSummary>> {
        let document = self.load().await?;
        Ok(document
            .collections
            .into_iter()
            .map(|collection| CollectionSummary {
                id: collection.id,
                name: collection.name,
                enabled: collection.enabled,
            })
            .collect())
    }

    async fn list_members(&self, collection: CollectionId) -> Result<Vec<CollectionMember>> {
        let document = self.load().await?;
        let Some(found) = document
            .collections
            .into_iter()
            .find(|candidate| candidate.id == collection)
        else {
            return Err(ProxyError::NotFound(format!(
                "collection {collection} is not in the store"
            )));
        };
        Ok(found
            .members
            .into_iter()
            .map(StoreMember::into_member)
            .collect())
    }

    async fn lookup_catalog(&self, source_id: &str) -> Result<Option<CatalogEntry>> {
        let document = self.load().await?;
        for collection in document.collections {
            if !collection.enabled {
                continue;
            }
            for member in collection.members {
                if member.source_id == source_id {
                    return Ok(Some(member.into_member().catalog));
                }
            }
        }
        Ok(None)
    }
}
