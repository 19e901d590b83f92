//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Translate requests into dispatcher calls
//! - Swap the route table when a new config arrives
//! - Shut down gracefully

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{build_table, ConfigError, RouterConfig};
use crate::dispatch::{DispatchError, Dispatcher, RequestInfo};
use crate::http::request::{query_pairs, request_id, UuidRequestId};
use crate::http::response::error_response;
use crate::observability::metrics;
use crate::routing::request_path;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub base_path: Arc<str>,
}

/// HTTP front-end for the dispatcher.
pub struct HttpServer {
    router: Router,
    dispatcher: Arc<Dispatcher>,
    config: RouterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RouterConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState {
            dispatcher: dispatcher.clone(),
            base_path: Arc::from(config.server.base_path.as_str()),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            dispatcher,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(route_handler))
            .route("/{*path}", any(route_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for driving without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configs received on `updates` replace the route table; a config that
    /// fails to compile leaves the current table in place.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
        updates: Option<mpsc::UnboundedReceiver<RouterConfig>>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.dispatcher.table().len(),
            "HTTP server starting"
        );

        if let Some(updates) = updates {
            tokio::spawn(reload_loop(
                self.dispatcher.clone(),
                updates,
                shutdown.resubscribe(),
            ));
        }

        let mut shutdown = shutdown;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Rebuild the table from `config` and install it.
pub fn apply_config(dispatcher: &Dispatcher, config: &RouterConfig) -> Result<(), ConfigError> {
    match build_table(config) {
        Ok(table) => {
            let routes = table.len();
            dispatcher.replace_table(table);
            metrics::record_reload(true);
            tracing::info!(routes, "Route table reloaded");
            Ok(())
        }
        Err(e) => {
            metrics::record_reload(false);
            tracing::error!(error = %e, "Route table reload failed, keeping current table");
            Err(e)
        }
    }
}

async fn reload_loop(
    dispatcher: Arc<Dispatcher>,
    mut updates: mpsc::UnboundedReceiver<RouterConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(config) => {
                    let _ = apply_config(&dispatcher, &config);
                }
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }
}

/// Select a route for the request and run its handler.
async fn route_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers());
    let path = request_path(request.uri().path(), &state.base_path);
    let query = query_pairs(request.uri().query());

    let route = match state.dispatcher.table().select(&path) {
        Ok(route) => route,
        Err(e) => {
            tracing::warn!(request_id = request_id.as_deref().unwrap_or("-"), path = %path, error = %e, "Validator failed");
            let response = error_response(&DispatchError::from(e), false);
            metrics::record_dispatch(response.status().as_u16(), start);
            return response;
        }
    };
    metrics::record_selection(&route);

    tracing::debug!(
        request_id = request_id.as_deref().unwrap_or("-"),
        method = %request.method(),
        path = %path,
        route = route.name().unwrap_or("-"),
        "Route selected"
    );

    let not_found = route.is_not_found();
    let info = RequestInfo {
        request_id: request_id.clone(),
        query,
        depth: 0,
    };

    let response = match state.dispatcher.dispatch(route, info) {
        Ok(reply) => reply.into_response(),
        Err(e) => {
            if not_found {
                tracing::debug!(request_id = request_id.as_deref().unwrap_or("-"), path = %path, "No route matched");
            } else {
                tracing::error!(request_id = request_id.as_deref().unwrap_or("-"), path = %path, error = %e, "Dispatch failed");
            }
            error_response(&e, not_found)
        }
    };

    metrics::record_dispatch(response.status().as_u16(), start);
    response
}
