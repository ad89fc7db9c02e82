//! Reqwest-backed upstream client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::{NativeView, RawResponse, UpstreamClient};
use crate::error::{ProxyError, Result};
use mirage_model::{MediaItem, Page};

/// Header carrying the upstream API token.
const API_TOKEN_HEADER: &str = "X-Api-Token";

/// Connection settings for the upstream media server.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: Url,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub max_ids_per_request: usize,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8096/").expect("static default url"),
            api_token: None,
            request_timeout: Duration::from_secs(10),
            max_ids_per_request: 50,
        }
    }
}

/// [`UpstreamClient`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpUpstreamClient {
    http: reqwest::Client,
    settings: UpstreamSettings,
}

impl HttpUpstreamClient {
    pub fn new(settings: UpstreamSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| {
                ProxyError::Config(format!("failed to build upstream http client: {err}"))
            })?;
        Ok(Self { http, settings })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.settings
            .base_url
            .join(path)
            .map_err(|err| ProxyError::Config(format!("invalid upstream path {path:?}: {err}")))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.settings.api_token {
            Some(token) => request.header(API_TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .authorize(self.http.get(url.clone()))
            .send()
            .await
            .map_err(|err| ProxyError::UpstreamUnavailable(format!("{url}: {err}")))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProxyError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(ProxyError::UpstreamUnavailable(format!(
                "{url}: upstream returned {status}"
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| ProxyError::UpstreamUnavailable(format!("{url}: malformed payload: {err}")))
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn get_views(&self) -> Result<Vec<NativeView>> {
        let page: Page<NativeView> = self.get_json(self.endpoint("views")?).await?;
        Ok(page.items)
    }

    async fn get_items_by_ids(&self, ids: &[String]) -> Result<Vec<MediaItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut url = self.endpoint("items")?;
        url.query_pairs_mut().append_pair("Ids", &ids.join(","));
        let page: Page<MediaItem> = self.get_json(url).await?;
        Ok(page.items)
    }

    async fn get_item(&self, id: &str) -> Result<MediaItem> {
        self.get_json(self.endpoint(&format!("items/{id}"))?).await
    }

    async fn proxy_raw(
        &self,
        path_and_query: &str,
        headers: &[(String, String)],
    ) -> Result<RawResponse> {
        let url = self.endpoint(path_and_query.trim_start_matches('/'))?;

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            if is_hop_by_hop(name) {
                continue;
            }
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                continue;
            };
            let Ok(value) = HeaderValue::from_str(value) else {
                continue;
            };
            header_map.append(name, value);
        }

        let response = self
            .authorize(self.http.get(url.clone()).headers(header_map))
            .send()
            .await
            .map_err(|err| ProxyError::UpstreamUnavailable(format!("{url}: {err}")))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|err| ProxyError::UpstreamUnavailable(format!("{url}: {err}")))?
            .to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn max_ids_per_request(&self) -> usize {
        self.settings.max_ids_per_request
    }
}

/// Headers that must not be forwarded in either direction. `host` and
/// `content-length` are set by the sending client itself.
pub fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "proxy-connection"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
            | "host"
            | "content-length"
    )
}
