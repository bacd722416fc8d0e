//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use driftnet_core::cache::TtlCache;
use driftnet_core::catalog::SourceCatalog;
use driftnet_core::config::DriftnetConfig;
use driftnet_core::fetch::{Fetch, UpstreamClient};
use driftnet_search::{DetailResolver, SearchAggregator, SearchMode};
use driftnet_web::run_server;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the API and relay server
    Server {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
        /// TOML file overriding the builtin source catalog
        #[arg(long)]
        sources: Option<PathBuf>,
    },
    /// Run one federated search and print the JSON response
    Search {
        /// Free-text title query
        query: String,
        /// Latency policy: fast or full
        #[arg(long, default_value = "full")]
        mode: String,
        /// TOML file overriding the builtin source catalog
        #[arg(long)]
        sources: Option<PathBuf>,
    },
    /// Resolve a catalog entry into its episode list
    Detail {
        /// Source display name from a search result
        source: String,
        /// Source-local catalog entry id
        id: String,
        /// TOML file overriding the builtin source catalog
        #[arg(long)]
        sources: Option<PathBuf>,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Server {
            host,
            port,
            sources,
        } => serve(host, port, sources).await,
        Commands::Search {
            query,
            mode,
            sources,
        } => run_search(query, mode, sources).await,
        Commands::Detail {
            source,
            id,
            sources,
        } => run_detail(source, id, sources).await,
    }
}

fn load_catalog(sources: Option<PathBuf>) -> anyhow::Result<SourceCatalog> {
    match sources {
        Some(path) => SourceCatalog::from_toml_file(&path)
            .with_context(|| format!("loading catalog from {}", path.display())),
        None => Ok(SourceCatalog::builtin()),
    }
}

/// Start the web server for API and relay access
///
/// # Errors
/// Fails when the bind address is invalid, the catalog file is unusable,
/// or the listener cannot be created.
async fn serve(host: String, port: u16, sources: Option<PathBuf>) -> anyhow::Result<()> {
    let catalog = load_catalog(sources)?;

    let mut config = DriftnetConfig::from_env();
    config.server.bind_address = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))?;

    println!("Driftnet server starting...");
    println!("Sources: {}", catalog.sources().len());
    println!("API: http://{host}:{port}/api/search?wd=<query>");
    println!("Relay: http://{host}:{port}/stream?url=<manifest>");
    println!();
    println!("Press Ctrl+C to stop the server");

    run_server(config, catalog)
        .await
        .map_err(|e| anyhow::anyhow!("server failed: {e}"))
}

/// Run a one-shot federated search and print the response
///
/// # Errors
/// Fails on an empty query or an unusable catalog file.
async fn run_search(query: String, mode: String, sources: Option<PathBuf>) -> anyhow::Result<()> {
    let catalog = Arc::new(load_catalog(sources)?);
    let config = DriftnetConfig::from_env();

    let fetch: Arc<dyn Fetch> = Arc::new(UpstreamClient::from_config(&config.http));
    let aggregator = SearchAggregator::new(
        catalog,
        fetch,
        Arc::new(TtlCache::new()),
        config.search.clone(),
    );

    let response = aggregator
        .search(&query, SearchMode::from_param(&mode))
        .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Resolve one detail document and print the episode list
///
/// # Errors
/// Fails for unknown sources, an unusable catalog file, or when the detail
/// document cannot be fetched.
async fn run_detail(source: String, id: String, sources: Option<PathBuf>) -> anyhow::Result<()> {
    let catalog = Arc::new(load_catalog(sources)?);
    let config = DriftnetConfig::from_env();

    let fetch: Arc<dyn Fetch> = Arc::new(UpstreamClient::from_config(&config.http));
    let resolver = DetailResolver::new(catalog, fetch);

    let response = resolver.resolve(&source, &id).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
