use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri},
    response::Response,
};
use tracing::debug;

use crate::AppState;
use crate::errors::{AppError, AppResult};
use mirage_core::upstream::http::is_hop_by_hop;

/// Forward the original request verbatim to the upstream server and return
/// its response unmodified, preserving protocol-relevant headers in both
/// directions.
pub(crate) async fn passthrough(
    state: &AppState,
    uri: &Uri,
    headers: &HeaderMap,
) -> AppResult<Response> {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let forwarded: Vec<(String, String)> = headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let raw = state.upstream.proxy_raw(path_and_query, &forwarded).await?;
    debug!("passthrough: path={} status={}", path_and_query, raw.status);

    let status = StatusCode::from_u16(raw.status).map_err(|_| {
        AppError::bad_gateway(format!("upstream returned invalid status {}", raw.status))
    })?;
    let mut builder = Response::builder().status(status);
    for (name, value) in &raw.headers {
        if is_hop_by_hop(name) {
            continue;
        }
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            continue;
        };
        builder = builder.header(name, value);
    }
    builder.body(Body::from(raw.body)).map_err(|err| {
        AppError::internal(format!("failed to assemble passthrough response: {err}"))
    })
}
