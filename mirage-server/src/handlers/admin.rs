use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::errors::AppResult;
use mirage_model::CollectionId;

/// Liveness probe for the front door.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /admin/cache/invalidate/{collectionId}`, called by the external
/// membership-refresh job after it rewrites a collection's member list.
pub async fn invalidate_collection_handler(
    State(state): State<AppState>,
    Path(collection_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let collection = CollectionId::from(collection_id);
    let removed = state.cache.invalidate(collection);
    info!("cache invalidation requested: collection={collection} removed={removed}");
    Ok(Json(json!({
        "Collection": collection.to_string(),
        "Invalidated": removed,
    })))
}
