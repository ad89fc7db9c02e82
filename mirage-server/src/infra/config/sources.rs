use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub upstream: FileUpstreamConfig,
    #[serde(default)]
    pub proxy: FileProxyConfig,
    #[serde(default)]
    pub collections: FileCollectionsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileUpstreamConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Humantime duration, e.g. `"10s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ids_per_request: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileProxyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_native_libraries: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_view_selection: Option<Vec<String>>,
    /// `"before"` puts virtual views first, `"after"` native views first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_view_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_missing_placeholders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hydration_width: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_deadline: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCollectionsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Configuration gathered from the process environment. Every knob the
/// deployment is likely to override per host has a `MIRAGE_*` variable.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub upstream_url: Option<String>,
    pub upstream_token: Option<String>,
    pub collections_file: Option<PathBuf>,
    pub cache_ttl: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("MIRAGE_CONFIG").ok().map(PathBuf::from),
            host: std::env::var("MIRAGE_HOST").ok(),
            port: std::env::var("MIRAGE_PORT").ok(),
            upstream_url: std::env::var("MIRAGE_UPSTREAM_URL").ok(),
            upstream_token: std::env::var("MIRAGE_UPSTREAM_TOKEN").ok(),
            collections_file: std::env::var("MIRAGE_COLLECTIONS_FILE")
                .ok()
                .map(PathBuf::from),
            cache_ttl: std::env::var("MIRAGE_CACHE_TTL").ok(),
        }
    }
}
