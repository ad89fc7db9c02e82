use once_cell::sync::Lazy;
use std::{
    fs,
    path::PathBuf,
    time::Duration,
};
use thiserror::Error;
use url::Url;

use super::models::{
    CollectionsConfig, Config, ConfigMetadata, ProxyConfig, ServerConfig, UpstreamConfig,
};
use super::sources::{EnvConfig, FileConfig};
use mirage_core::options::ViewOrder;

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("mirage.toml"),
        PathBuf::from("config/mirage.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

/// Non-fatal findings from composition, logged at startup.
#[derive(Debug, Default)]
pub struct ConfigWarnings {
    pub items: Vec<String>,
}

impl ConfigWarnings {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, message: impl Into<String>) {
        self.items.push(message.into());
    }
}

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("configuration file not found: {path}")]
    MissingConfig { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid upstream base url {value:?}: {source}")]
    InvalidUpstreamUrl {
        value: String,
        source: url::ParseError,
    },

    #[error("invalid duration for {field}: {value:?}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        let env_config = EnvConfig::gather();
        let (file_config, config_path) = self.load_file_config(&env_config)?;
        self.compose(file_config, env_config, config_path, env_file_loaded)
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let (path, is_explicit) = match explicit {
            Some(path) => (Some(path), true),
            None => (
                DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .find(|candidate| candidate.exists())
                    .cloned(),
                false,
            ),
        };

        let Some(path) = path else {
            return Ok((None, None));
        };
        if !path.exists() {
            if is_explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let raw = fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = toml::from_str::<FileConfig>(&raw).map_err(|source| ConfigLoadError::Parse {
            path: path.clone(),
            source,
        })?;
        Ok((Some(parsed), Some(path)))
    }

    fn compose(
        &self,
        file_config: Option<FileConfig>,
        env_config: EnvConfig,
        config_path: Option<PathBuf>,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();
        let file = file_config.unwrap_or_default();
        let defaults = Config::default();

        let host = env_config
            .host
            .or(file.server.host)
            .unwrap_or(defaults.server.host);
        let port = match env_config.port {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigLoadError::InvalidValue {
                    field: "MIRAGE_PORT",
                    value: raw,
                })?,
            None => file.server.port.unwrap_or(defaults.server.port),
        };

        let base_url = match env_config.upstream_url.or(file.upstream.base_url) {
            Some(raw) => {
                // A trailing slash keeps Url::join from eating the last path
                // segment of a base like http://host/emby.
                let normalized = if raw.ends_with('/') {
                    raw.clone()
                } else {
                    format!("{raw}/")
                };
                Url::parse(&normalized)
                    .map_err(|source| ConfigLoadError::InvalidUpstreamUrl { value: raw, source })?
            }
            None => {
                warnings.push(format!(
                    "no upstream base url configured; defaulting to {}",
                    defaults.upstream.base_url
                ));
                defaults.upstream.base_url
            }
        };

        let api_token = env_config.upstream_token.or(file.upstream.api_token);
        if api_token.is_none() {
            warnings.push(
                "no upstream api token configured; upstream requests will be unauthenticated",
            );
        }

        let request_timeout = parse_duration(
            "upstream.request_timeout",
            file.upstream.request_timeout,
            defaults.upstream.request_timeout,
        )?;

        let cache_ttl = parse_duration(
            "proxy.cache_ttl",
            env_config.cache_ttl.or(file.proxy.cache_ttl),
            defaults.proxy.cache_ttl,
        )?;
        if cache_ttl.is_zero() {
            warnings.push("proxy.cache_ttl is zero; every page request repays full materialization");
        }

        let chunk_timeout = parse_duration(
            "proxy.chunk_timeout",
            file.proxy.chunk_timeout,
            defaults.proxy.chunk_timeout,
        )?;
        let request_deadline = parse_duration(
            "proxy.request_deadline",
            file.proxy.request_deadline,
            defaults.proxy.request_deadline,
        )?;

        let mut hydration_width = file
            .proxy
            .hydration_width
            .unwrap_or(defaults.proxy.hydration_width);
        if hydration_width == 0 {
            warnings.push("proxy.hydration_width of 0 clamped to 1");
            hydration_width = 1;
        }

        let native_view_order = match file.proxy.native_view_order {
            Some(raw) => {
                ViewOrder::parse(&raw).ok_or(ConfigLoadError::InvalidValue {
                    field: "proxy.native_view_order",
                    value: raw,
                })?
            }
            None => defaults.proxy.native_view_order,
        };

        let collections_file = env_config.collections_file.or(file.collections.file);
        if collections_file.is_none() {
            warnings.push("no collections file configured; no virtual views will be exposed");
        }

        let config = Config {
            server: ServerConfig { host, port },
            upstream: UpstreamConfig {
                base_url,
                api_token,
                request_timeout,
                max_ids_per_request: file
                    .upstream
                    .max_ids_per_request
                    .unwrap_or(defaults.upstream.max_ids_per_request)
                    .max(1),
            },
            proxy: ProxyConfig {
                enabled: file.proxy.enabled.unwrap_or(defaults.proxy.enabled),
                merge_native_libraries: file
                    .proxy
                    .merge_native_libraries
                    .unwrap_or(defaults.proxy.merge_native_libraries),
                native_view_selection: file.proxy.native_view_selection.unwrap_or_default(),
                native_view_order,
                show_missing_placeholders: file
                    .proxy
                    .show_missing_placeholders
                    .unwrap_or(defaults.proxy.show_missing_placeholders),
                cache_ttl,
                hydration_width,
                chunk_timeout,
                request_deadline,
            },
            collections: CollectionsConfig {
                file: collections_file,
            },
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };

        Ok(ConfigLoad { config, warnings })
    }
}

fn parse_duration(
    field: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        Some(raw) => humantime::parse_duration(&raw)
            .map_err(|_| ConfigLoadError::InvalidDuration { field, value: raw }),
        None => Ok(default),
    }
}
