use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use mirage_core::options::{ProxyOptions, ViewOrder};
use mirage_core::upstream::UpstreamSettings;

/// Fully resolved configuration: file values, environment overrides, and
/// defaults composed by the loader.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub proxy: ProxyConfig,
    pub collections: CollectionsConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8097,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub max_ids_per_request: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        let defaults = UpstreamSettings::default();
        Self {
            base_url: defaults.base_url,
            api_token: None,
            request_timeout: defaults.request_timeout,
            max_ids_per_request: defaults.max_ids_per_request,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub merge_native_libraries: bool,
    pub native_view_selection: Vec<String>,
    pub native_view_order: ViewOrder,
    pub show_missing_placeholders: bool,
    pub cache_ttl: Duration,
    pub hydration_width: usize,
    pub chunk_timeout: Duration,
    pub request_deadline: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        let defaults = ProxyOptions::default();
        Self {
            enabled: defaults.enabled,
            merge_native_libraries: defaults.merge_native_libraries,
            native_view_selection: Vec::new(),
            native_view_order: defaults.native_view_order,
            show_missing_placeholders: defaults.show_missing_placeholders,
            cache_ttl: defaults.cache_ttl,
            hydration_width: defaults.hydration_width,
            chunk_timeout: defaults.chunk_timeout,
            request_deadline: defaults.request_deadline,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectionsConfig {
    /// Collection store document written by the external refresh job.
    pub file: Option<PathBuf>,
}

/// Provenance of the loaded configuration, for startup logging.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

impl Config {
    /// The immutable options struct handed to the compositor and router.
    pub fn proxy_options(&self) -> ProxyOptions {
        ProxyOptions {
            enabled: self.proxy.enabled,
            merge_native_libraries: self.proxy.merge_native_libraries,
            native_view_selection: self.proxy.native_view_selection.iter().cloned().collect(),
            native_view_order: self.proxy.native_view_order,
            show_missing_placeholders: self.proxy.show_missing_placeholders,
            cache_ttl: self.proxy.cache_ttl,
            hydration_width: self.proxy.hydration_width,
            chunk_timeout: self.proxy.chunk_timeout,
            request_deadline: self.proxy.request_deadline,
        }
    }

    pub fn upstream_settings(&self) -> UpstreamSettings {
        UpstreamSettings {
            base_url: self.upstream.base_url.clone(),
            api_token: self.upstream.api_token.clone(),
            request_timeout: self.upstream.request_timeout,
            max_ids_per_request: self.upstream.max_ids_per_request,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
