//! URL router service.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::RouteTable ──▶ dispatch::Dispatcher
//!                         │                                         │
//!                         │                                         ▼
//!     Client Response     │                                    Handler (demo)
//!     ◀───────────────────┘◀─────────────── Reply ◀─────────────────┘
//!
//!     routes file ──▶ config::ConfigWatcher ──▶ table swap
//! ```
//!
//! Usage: `url-router [routes.toml]` (or `URL_ROUTER_CONFIG`).

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use url_router::config::{build_links, build_table, load_config, ConfigWatcher, RouterConfig};
use url_router::dispatch::Dispatcher;
use url_router::http::HttpServer;
use url_router::lifecycle::{spawn_signal_handler, Shutdown};
use url_router::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("URL_ROUTER_CONFIG").ok())
        .map(PathBuf::from);

    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("url-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        config = ?config_path,
        bind_address = %config.server.bind_address,
        base_path = %config.server.base_path,
        routes = config.routes.len(),
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let table = build_table(&config)?;
    let links = build_links(&config)?;
    let dispatcher = Arc::new(Dispatcher::new(table, url_router::demo::registry()).with_links(links));

    let (updates, _watcher) = match &config_path {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (Some(rx), Some(watcher.run()?))
        }
        None => (None, None),
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let rx = shutdown.subscribe();
    spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, dispatcher);
    server.run(listener, rx, updates).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
