use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Uri},
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use crate::AppState;
use crate::errors::{AppError, AppResult};
use crate::handlers::passthrough;
use mirage_core::cache::{CachedSet, ViewKey};
use mirage_core::sorting;
use mirage_core::token::{self, Decoded, Namespace};
use mirage_model::{CollectionId, ItemsQuery, MediaItem, Page, View};

/// `GET /views`: the merged top-level view list.
///
/// Cheap enough to compose on every call; only per-view materializations go
/// through the cache.
pub async fn get_views_handler(State(state): State<AppState>) -> AppResult<Json<Page<View>>> {
    let views = state
        .compositor
        .compose_top_level_views(&state.options)
        .await?;
    Ok(Json(Page::complete(views)))
}

/// `GET /views/{viewId}/items`. Native views pass through verbatim,
/// virtual views are served from the materialization cache.
pub async fn get_view_items_handler(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Query(query): Query<ItemsQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> AppResult<Response> {
    match token::decode(&view_id)? {
        Decoded::Native => passthrough(&state, &uri, &headers).await,
        Decoded::Virtual {
            namespace: Namespace::View,
            source_id,
        } => {
            let collection = token::view_collection(&source_id)?;
            virtual_view_page(&state, collection, &query)
                .await
                .map(IntoResponse::into_response)
        }
        Decoded::Virtual {
            namespace: Namespace::Item,
            ..
        } => Err(AppError::not_found(format!("not a view: {view_id}"))),
    }
}

async fn virtual_view_page(
    state: &AppState,
    collection: CollectionId,
    query: &ItemsQuery,
) -> AppResult<Json<Page<MediaItem>>> {
    // Unknown and disabled collections are invisible, exactly like an
    // unknown native id upstream.
    if state
        .compositor
        .find_collection(collection)
        .await?
        .is_none()
    {
        return Err(AppError::not_found(format!("no such view: {collection}")));
    }

    let sort = query.sort_spec();
    let filters = query.filters();
    let page = query.page_spec();
    let key = ViewKey::new(collection, &sort, &filters);

    // The build runs on its own task: a request abandoning the wait at the
    // deadline must not cancel the leader other waiters share.
    let build_handle = {
        let cache = Arc::clone(&state.cache);
        let compositor = Arc::clone(&state.compositor);
        let options = state.options.clone();
        let ttl = state.options.cache_ttl;
        let key = key.clone();
        tokio::spawn(async move {
            cache
                .get_or_build(key, ttl, move || async move {
                    let hydration = compositor.materialize_members(collection, &options).await?;
                    let degraded = hydration.degraded();
                    let mut items = sorting::filter_candidates(hydration.items, &filters);
                    sorting::sort_candidates(&mut items, &sort);
                    Ok(CachedSet::new(items, degraded))
                })
                .await
        })
    };

    let set = match tokio::time::timeout(state.options.request_deadline, build_handle).await {
        Ok(Ok(Ok(set))) => set,
        Ok(Ok(Err(err))) => return Err(AppError::from(&*err)),
        Ok(Err(join_err)) => {
            return Err(AppError::internal(format!(
                "view materialization task failed: {join_err}"
            )));
        }
        Err(_elapsed) => match state.cache.peek(&key) {
            // Partial degradation: a stale page beats failing the request.
            Some(stale) => {
                warn!("request deadline hit; serving stale cache: collection={collection}");
                stale
            }
            None => {
                return Err(AppError::bad_gateway(format!(
                    "upstream did not respond within the request deadline for view {collection}"
                )));
            }
        },
    };

    let (items, total) = sorting::slice_page(&set.items, &page);
    Ok(Json(Page::windowed(
        items,
        total as u64,
        page.start_index as u64,
    )))
}
