//! View composition: the merged top-level library list and the member sets
//! of virtual views.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ProxyError, Result};
use crate::hydrator::{Hydration, ItemHydrator, ItemRef};
use crate::membership::{CollectionSummary, MembershipReader};
use crate::options::{ProxyOptions, ViewOrder};
use crate::token;
use crate::upstream::{NativeView, UpstreamClient};
use mirage_model::{CollectionId, CollectionType, ItemKind, LocationType, MediaItem, View};

/// Builds client-facing views out of upstream libraries and configured
/// collections.
pub struct ViewCompositor {
    upstream: Arc<dyn UpstreamClient>,
    membership: Arc<dyn MembershipReader>,
    hydrator: ItemHydrator,
}

impl fmt::Debug for ViewCompositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCompositor")
            .field("hydrator", &self.hydrator)
            .finish_non_exhaustive()
    }
}

impl ViewCompositor {
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        membership: Arc<dyn MembershipReader>,
        hydrator: ItemHydrator,
    ) -> Self {
        Self {
            upstream,
            membership,
            hydrator,
        }
    }

    /// The merged top-level view list.
    ///
    /// Native views are fetched live; virtual views come from enabled
    /// collections with ids minted by the codec. The result carries no
    /// duplicate ids and is stable for identical configuration and upstream
    /// state.
    pub async fn compose_top_level_views(&self, opts: &ProxyOptions) -> Result<Vec<View>> {
        let native = self.upstream.get_views().await?;
        if !opts.enabled {
            return Ok(native.into_iter().map(native_view).collect());
        }

        let native: Vec<View> = if opts.merge_native_libraries {
            native
                .into_iter()
                .filter(|view| {
                    opts.native_view_selection.is_empty()
                        || opts.native_view_selection.contains(&view.id)
                })
                .map(native_view)
                .collect()
        } else {
            Vec::new()
        };

        let virtual_views = self.virtual_views().await?;

        let (first, second) = match opts.native_view_order {
            ViewOrder::Before => (virtual_views, native),
            ViewOrder::After => (native, virtual_views),
        };

        let mut seen = HashSet::new();
        let merged: Vec<View> = first
            .into_iter()
            .chain(second)
            .filter(|view| seen.insert(view.id.clone()))
            .collect();
        debug!("composed top-level views: total={}", merged.len());
        Ok(merged)
    }

    async fn virtual_views(&self) -> Result<Vec<View>> {
        let collections = self.membership.list_collections().await?;
        Ok(collections
            .iter()
            .filter(|collection| collection.enabled)
            .map(virtual_view)
            .collect())
    }

    /// Look up an enabled collection by id.
    pub async fn find_collection(
        &self,
        collection: CollectionId,
    ) -> Result<Option<CollectionSummary>> {
        Ok(self
            .membership
            .list_collections()
            .await?
            .into_iter()
            .find(|summary| summary.enabled && summary.id == collection))
    }

    /// Member references of a virtual view.
    ///
    /// Members with no upstream presence become placeholder refs. When
    /// placeholders are disabled they are dropped from the candidate set
    /// entirely: not counted, not returned, not paginated.
    pub async fn compose_view_members(
        &self,
        collection: CollectionId,
        opts: &ProxyOptions,
    ) -> Result<Vec<ItemRef>> {
        let members = self.membership.list_members(collection).await?;
        let mut refs = Vec::with_capacity(members.len());
        for member in members {
            match member.upstream_id {
                Some(upstream_id) => refs.push(ItemRef::Native { upstream_id }),
                None if opts.show_missing_placeholders => refs.push(ItemRef::Placeholder {
                    token: token::item_token(&member.source_id),
                    catalog: member.catalog,
                }),
                None => {}
            }
        }
        Ok(refs)
    }

    /// Materialize the full, unordered candidate set of a virtual view.
    ///
    /// Chunk failures degrade the set silently; only a pass that yields
    /// nothing despite failures surfaces as upstream-unavailable.
    pub async fn materialize_members(
        &self,
        collection: CollectionId,
        opts: &ProxyOptions,
    ) -> Result<Hydration> {
        let refs = self.compose_view_members(collection, opts).await?;
        let hydration = self.hydrator.hydrate(refs).await;
        if hydration.items.is_empty() && hydration.degraded() {
            return Err(ProxyError::UpstreamUnavailable(format!(
                "no members of collection {collection} could be hydrated ({} failed chunks)",
                hydration.failed_chunks
            )));
        }
        Ok(hydration)
    }

    /// Synthesize the single-item response for a placeholder token.
    pub async fn placeholder_item(&self, source_id: &str) -> Result<Option<MediaItem>> {
        let Some(catalog) = self.membership.lookup_catalog(source_id).await? else {
            return Ok(None);
        };
        Ok(Some(catalog.to_placeholder(token::item_token(source_id))))
    }

    /// Synthesize a folder-like item for a virtual view, for clients that
    /// fetch the view itself through the item endpoint.
    pub async fn view_item(&self, collection: CollectionId) -> Result<Option<MediaItem>> {
        let Some(summary) = self.find_collection(collection).await? else {
            return Ok(None);
        };
        Ok(Some(MediaItem {
            id: token::view_token(&collection),
            name: summary.name,
            sort_name: None,
            kind: ItemKind::BoxSet,
            overview: None,
            date_created: None,
            community_rating: None,
            production_year: None,
            location_type: LocationType::Virtual,
            image_url: None,
        }))
    }
}

fn native_view(view: NativeView) -> View {
    View {
        id: view.id,
        name: view.name,
        collection_type: view.collection_type,
    }
}

fn virtual_view(collection: &CollectionSummary) -> View {
    View {
        id: token::view_token(&collection.id),
        name: collection.name.clone(),
        collection_type: CollectionType::BoxSets,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::membership::{CollectionMember, MockMembershipReader};
    use crate::upstream::MockUpstreamClient;
    use mirage_model::CatalogEntry;

    fn native_views() -> Vec<NativeView> {
        vec![
            NativeView {
                id: "nat-movies".into(),
                name: "Movies".into(),
                collection_type: CollectionType::Movies,
            },
            NativeView {
                id: "nat-shows".into(),
                name: "Shows".into(),
                collection_type: CollectionType::TvShows,
            },
        ]
    }

    fn collections(ids: &[(CollectionId, &str, bool)]) -> Vec<CollectionSummary> {
        ids.iter()
            .map(|(id, name, enabled)| CollectionSummary {
                id: *id,
                name: name.to_string(),
                enabled: *enabled,
            })
            .collect()
    }

    fn compositor(
        upstream: MockUpstreamClient,
        membership: MockMembershipReader,
    ) -> ViewCompositor {
        let upstream: Arc<dyn UpstreamClient> = Arc::new(upstream);
        ViewCompositor::new(
            Arc::clone(&upstream),
            Arc::new(membership),
            ItemHydrator::new(upstream, 4, Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn merges_native_before_virtual_by_default() {
        let noir = CollectionId::new();
        let mut upstream = MockUpstreamClient::new();
        upstream.expect_get_views().returning(|| Ok(native_views()));
        let mut membership = MockMembershipReader::new();
        membership
            .expect_list_collections()
            .returning(move || Ok(collections(&[(noir, "Noir Essentials", true)])));

        let views = compositor(upstream, membership)
            .compose_top_level_views(&ProxyOptions::default())
            .await
            .unwrap();

        assert_eq!(views.len(), 3);
        assert_eq!(views[0].id, "nat-movies");
        assert_eq!(views[1].id, "nat-shows");
        assert_eq!(views[2].id, token::view_token(&noir));
        assert_eq!(views[2].collection_type, CollectionType::BoxSets);
    }

    #[tokio::test]
    async fn order_before_puts_virtual_views_first() {
        let noir = CollectionId::new();
        let mut upstream = MockUpstreamClient::new();
        upstream.expect_get_views().returning(|| Ok(native_views()));
        let mut membership = MockMembershipReader::new();
        membership
            .expect_list_collections()
            .returning(move || Ok(collections(&[(noir, "Noir Essentials", true)])));

        let opts = ProxyOptions {
            native_view_order: ViewOrder::Before,
            ..ProxyOptions::default()
        };
        let views = compositor(upstream, membership)
            .compose_top_level_views(&opts)
            .await
            .unwrap();

        assert_eq!(views[0].id, token::view_token(&noir));
        assert_eq!(views[1].id, "nat-movies");
    }

    #[tokio::test]
    async fn selection_filters_native_views_and_disabled_collections_hide() {
        let noir = CollectionId::new();
        let shelved = CollectionId::new();
        let mut upstream = MockUpstreamClient::new();
        upstream.expect_get_views().returning(|| Ok(native_views()));
        let mut membership = MockMembershipReader::new();
        membership.expect_list_collections().returning(move || {
            Ok(collections(&[
                (noir, "Noir Essentials", true),
                (shelved, "Shelved", false),
            ]))
        });

        let opts = ProxyOptions {
            native_view_selection: ["nat-movies".to_string()].into(),
            ..ProxyOptions::default()
        };
        let views = compositor(upstream, membership)
            .compose_top_level_views(&opts)
            .await
            .unwrap();

        let ids: Vec<_> = views.iter().map(|view| view.id.as_str()).collect();
        assert_eq!(ids, vec!["nat-movies", token::view_token(&noir).as_str()]);
    }

    #[tokio::test]
    async fn disabled_proxy_passes_native_views_through_unfiltered() {
        let mut upstream = MockUpstreamClient::new();
        upstream.expect_get_views().returning(|| Ok(native_views()));
        let membership = MockMembershipReader::new();

        let opts = ProxyOptions {
            enabled: false,
            native_view_selection: ["nat-movies".to_string()].into(),
            ..ProxyOptions::default()
        };
        let views = compositor(upstream, membership)
            .compose_top_level_views(&opts)
            .await
            .unwrap();

        assert_eq!(views.len(), 2);
    }

    #[tokio::test]
    async fn missing_members_drop_when_placeholders_disabled() {
        let noir = CollectionId::new();
        let upstream = MockUpstreamClient::new();
        let mut membership = MockMembershipReader::new();
        membership.expect_list_members().returning(|_| {
            Ok(vec![
                CollectionMember {
                    source_id: "tmdb:101".into(),
                    upstream_id: Some("u1".into()),
                    catalog: CatalogEntry::default(),
                },
                CollectionMember {
                    source_id: "tmdb:102".into(),
                    upstream_id: None,
                    catalog: CatalogEntry {
                        name: "Missing One".into(),
                        ..CatalogEntry::default()
                    },
                },
            ])
        });

        let compositor = compositor(upstream, membership);

        let opts = ProxyOptions {
            show_missing_placeholders: false,
            ..ProxyOptions::default()
        };
        let refs = compositor.compose_view_members(noir, &opts).await.unwrap();
        assert_eq!(
            refs,
            vec![ItemRef::Native {
                upstream_id: "u1".into()
            }]
        );

        let opts = ProxyOptions::default();
        let refs = compositor.compose_view_members(noir, &opts).await.unwrap();
        assert_eq!(refs.len(), 2);
        assert!(matches!(&refs[1], ItemRef::Placeholder { token, .. }
            if token == &token::item_token("tmdb:102")));
    }
}
