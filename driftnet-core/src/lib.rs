//! Driftnet Core - Source catalog, upstream fetching, and caching
//!
//! This crate provides the fundamental building blocks for federated catalog
//! search and stream relaying: source definitions, the browser-identity
//! upstream HTTP client, a TTL cache, URL absolutization, and the ordered
//! manifest pattern matchers shared by the resolver and the relay.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod scrape;
pub mod urls;

// Re-export main types for convenient access
pub use cache::TtlCache;
pub use catalog::{SourceCatalog, SourceDefinition};
pub use config::DriftnetConfig;
pub use fetch::{Fetch, FetchError, UpstreamClient};

/// Core errors that can bubble up from any Driftnet subsystem.
#[derive(Debug, thiserror::Error)]
pub enum DriftnetError {
    /// Upstream HTTP request failed.
    #[error("Upstream fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Source catalog could not be loaded or is unusable.
    #[error("Catalog error: {reason}")]
    Catalog {
        /// The reason the catalog was rejected
        reason: String,
    },

    /// Invalid runtime configuration.
    #[error("Configuration error: {reason}")]
    Configuration {
        /// The reason the configuration was rejected
        reason: String,
    },

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results with DriftnetError.
pub type Result<T> = std::result::Result<T, DriftnetError>;
