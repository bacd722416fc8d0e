//! Driftnet Web - JSON API and stream relay server
//!
//! Serves the search and detail JSON endpoints, the URL-rewriting stream
//! relay that keeps every player fetch on this origin, the image proxy, and
//! the static frontend assets.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]

pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, build_router, run_server};
