use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::{admin, items, views},
};

/// Build the client-facing router.
///
/// Paths mirror the upstream protocol the proxy emulates; the HTTP front
/// door routes matching paths here and everything else straight upstream.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(admin::health_handler))
        .route("/views", get(views::get_views_handler))
        .route("/views/{view_id}/items", get(views::get_view_items_handler))
        .route("/items/{item_id}", get(items::get_item_handler))
        .route(
            "/admin/cache/invalidate/{collection_id}",
            post(admin::invalidate_collection_handler),
        )
        .with_state(state)
}
