//! # Mirage Server
//!
//! Virtual-library reverse proxy for a media server.
//!
//! ## Overview
//!
//! Mirage sits between clients and the upstream media server, speaking the
//! same library protocol the server does:
//!
//! - **Merged view list**: real libraries and rule-defined virtual
//!   collections side by side, in configured order
//! - **Passthrough**: requests for native views and items forwarded verbatim
//! - **Virtual views**: membership read from the external collection store,
//!   hydrated upstream with bounded concurrency, sorted deterministically,
//!   and cached with a single-flight guarantee
//! - **Placeholders**: collection members with no upstream presence rendered
//!   from locally cached catalog metadata
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - reqwest against the upstream media server API
//! - a JSON collection-store document maintained by the external rule engine

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mirage_core::membership::MembershipReader;
use mirage_core::upstream::{HttpUpstreamClient, UpstreamClient};
use mirage_server::{
    AppState,
    infra::{
        config::{ConfigLoad, ConfigLoader},
        membership_file::FileMembershipReader,
    },
    routes,
};

#[derive(Debug, Parser)]
#[command(
    name = "mirage-server",
    about = "Virtual-library reverse proxy for media clients",
    version
)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, env = "MIRAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Path to a .env file loaded before the configuration.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Override the configured bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the configured bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path.clone());
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path.clone());
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration loaded");
    }
    for warning in &warnings.items {
        warn!(message = %warning, "configuration warning");
    }

    let upstream: Arc<dyn UpstreamClient> = Arc::new(
        HttpUpstreamClient::new(config.upstream_settings())
            .context("failed to build upstream client")?,
    );
    let membership: Arc<dyn MembershipReader> =
        Arc::new(FileMembershipReader::new(config.collections.file.clone()));

    let state = AppState::new(config.proxy_options(), upstream, membership);
    let router = routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = config.bind_addr();
    info!(
        "Starting Mirage proxy on {} (upstream {})",
        addr, config.upstream.base_url
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            warn!("failed to install shutdown handler: {err}");
            // Without a handler there is nothing to wait for; keep serving.
            std::future::pending::<()>().await;
        }
    }
}
