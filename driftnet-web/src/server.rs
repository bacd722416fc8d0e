//! HTTP server wiring for the Driftnet API and relay.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use driftnet_core::cache::TtlCache;
use driftnet_core::catalog::SourceCatalog;
use driftnet_core::config::DriftnetConfig;
use driftnet_core::fetch::{Fetch, UpstreamClient};
use driftnet_search::{DetailResolver, SearchAggregator};

use crate::handlers::{api_detail, api_search, img_proxy, stream_relay};

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Federated search orchestrator
    pub aggregator: Arc<SearchAggregator>,
    /// Detail/episode resolver
    pub resolver: Arc<DetailResolver>,
    /// Raw upstream client used by the relay and image proxy
    pub client: UpstreamClient,
}

impl AppState {
    /// Wires the aggregator, resolver, and shared client from configuration.
    ///
    /// The TTL cache is created here and handed to the aggregator as a
    /// dependency; nothing else holds a reference to it.
    pub fn new(config: &DriftnetConfig, catalog: SourceCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let client = UpstreamClient::from_config(&config.http);
        let fetch: Arc<dyn Fetch> = Arc::new(client.clone());
        let cache = Arc::new(TtlCache::new());

        Self {
            aggregator: Arc::new(SearchAggregator::new(
                Arc::clone(&catalog),
                Arc::clone(&fetch),
                cache,
                config.search.clone(),
            )),
            resolver: Arc::new(DetailResolver::new(catalog, fetch)),
            client,
        }
    }
}

/// Builds the application router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // JSON API endpoints
        .route("/api/search", get(api_search))
        .route("/api/detail", get(api_detail))
        // Stream relay and image proxy
        .route("/stream", get(stream_relay))
        .route("/img", get(img_proxy))
        // Static frontend assets (placeholder included)
        .fallback_service(ServeDir::new("driftnet-web/static"))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the server until the listener fails.
///
/// # Errors
/// Returns an error when binding or serving fails; individual request
/// failures never reach here.
pub async fn run_server(
    config: DriftnetConfig,
    catalog: SourceCatalog,
) -> Result<(), Box<dyn std::error::Error>> {
    let bind_address = config.server.bind_address;
    let state = AppState::new(&config, catalog);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!(address = %bind_address, "driftnet server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
