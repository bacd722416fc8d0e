//! Driftnet Search - Federated catalog search and episode resolution
//!
//! Fans a query out to every configured source, collapses their
//! heterogeneous response shapes into one normalized result list, and
//! resolves a chosen entry into a playable episode list, escalating to
//! page scraping when a source publishes wrapper pages instead of
//! manifests.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]

pub mod aggregator;
pub mod errors;
pub mod extract;
pub mod playlist;
pub mod resolver;
pub mod types;

// Re-export main types
pub use aggregator::SearchAggregator;
pub use errors::SearchError;
pub use resolver::DetailResolver;
pub use types::{CatalogItem, DetailResponse, Episode, SearchMode, SearchResponse};

/// Convenience type alias for Results with SearchError.
pub type Result<T> = std::result::Result<T, SearchError>;
