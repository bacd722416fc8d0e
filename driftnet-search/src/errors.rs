//! Error types for federated search and detail resolution.
//!
//! Individual upstream failures never appear here; they are absorbed inside
//! the aggregator and resolver as "try the next option". Only input problems
//! and total detail-fetch exhaustion become errors.

use thiserror::Error;

/// Errors that can occur during search and detail operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search query was empty after trimming.
    #[error("Empty search query")]
    EmptyQuery,

    /// The requested source is not in the catalog.
    #[error("Unknown source: {name}")]
    UnknownSource {
        /// The source name that was requested
        name: String,
    },

    /// The detail document itself could not be fetched.
    #[error("Detail fetch failed for {source_name}/{id}: {reason}")]
    DetailFetchFailed {
        /// The source that was queried
        source_name: String,
        /// The catalog entry id
        id: String,
        /// The reason for the failure
        reason: String,
    },
}
