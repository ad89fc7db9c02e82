use axum::{
    extract::{Path, State},
    http::{HeaderMap, Uri},
    response::{IntoResponse, Json, Response},
};

use crate::AppState;
use crate::errors::{AppError, AppResult};
use crate::handlers::passthrough;
use mirage_core::token::{self, Decoded, Namespace};

/// `GET /items/{itemId}`. Native items pass through verbatim; placeholder
/// tokens are synthesized from locally cached catalog metadata, with no
/// playback-capable fields.
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> AppResult<Response> {
    match token::decode(&item_id)? {
        Decoded::Native => passthrough(&state, &uri, &headers).await,
        Decoded::Virtual {
            namespace: Namespace::Item,
            source_id,
        } => {
            let Some(item) = state.compositor.placeholder_item(&source_id).await? else {
                return Err(AppError::not_found(format!(
                    "no catalog entry for {item_id}"
                )));
            };
            Ok(Json(item).into_response())
        }
        Decoded::Virtual {
            namespace: Namespace::View,
            source_id,
        } => {
            // Clients fetch a view's own record through the item endpoint
            // when opening it as a folder.
            let collection = token::view_collection(&source_id)?;
            let Some(item) = state.compositor.view_item(collection).await? else {
                return Err(AppError::not_found(format!("no such view: {collection}")));
            };
            Ok(Json(item).into_response())
        }
    }
}
