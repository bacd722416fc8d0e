//! Detail document resolution and episode recovery.
//!
//! Resolves a `(source, id)` pair into a playable episode list. Episode
//! URLs that are not already manifests escalate to a page scrape; when even
//! that fails, the original page URLs are kept as a navigable fallback
//! rather than returning nothing.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use driftnet_core::catalog::SourceCatalog;
use driftnet_core::fetch::Fetch;
use driftnet_core::scrape::extract_manifest_url;
use driftnet_core::urls::is_manifest_url;

use crate::errors::SearchError;
use crate::extract::{extract_detail_item, field_string};
use crate::playlist::decode_play_groups;
use crate::types::{DetailResponse, Episode};

/// Outcome of resolving a single episode URL.
enum EpisodeOutcome {
    /// URL is (or was scraped into) a direct stream candidate
    Playable(Episode),
    /// Scrape failed; the original page URL is kept as a fallback
    Fallback(Episode),
}

/// Resolves catalog entries into episode lists.
#[derive(Debug)]
pub struct DetailResolver {
    catalog: Arc<SourceCatalog>,
    fetch: Arc<dyn Fetch>,
}

impl DetailResolver {
    /// Creates a resolver over the given catalog and fetch seam.
    pub fn new(catalog: Arc<SourceCatalog>, fetch: Arc<dyn Fetch>) -> Self {
        Self { catalog, fetch }
    }

    /// Fetches and decodes one detail document.
    ///
    /// An unresolvable document (no recognizable item, no parsable play
    /// data) is an empty success; the episode list is only non-empty when
    /// something usable was recovered.
    ///
    /// # Errors
    /// - `SearchError::UnknownSource` - Source name not in the catalog
    /// - `SearchError::DetailFetchFailed` - The detail document itself could
    ///   not be fetched; unlike search, there is no sibling source to fall
    ///   back to
    pub async fn resolve(&self, source_name: &str, id: &str) -> Result<DetailResponse, SearchError> {
        let source = self
            .catalog
            .find(source_name)
            .ok_or_else(|| SearchError::UnknownSource {
                name: source_name.to_string(),
            })?;

        let url = source.detail_url(id);
        let payload =
            self.fetch
                .fetch_json(&url)
                .await
                .map_err(|error| SearchError::DetailFetchFailed {
                    source_name: source_name.to_string(),
                    id: id.to_string(),
                    reason: error.to_string(),
                })?;

        let Some(item) = extract_detail_item(&payload) else {
            debug!(source = source_name, id, "detail document has no item");
            return Ok(DetailResponse {
                code: 0,
                title: String::new(),
                episodes: Vec::new(),
            });
        };

        let title = field_string(&item, &["vod_name", "name", "title"]);
        let decoded = decode_play_groups(&item, &source.base);

        let outcomes = join_all(
            decoded
                .into_iter()
                .map(|episode| self.resolve_episode(episode)),
        )
        .await;

        let mut playable = Vec::new();
        let mut fallbacks = Vec::new();
        for outcome in outcomes {
            match outcome {
                EpisodeOutcome::Playable(episode) => playable.push(episode),
                EpisodeOutcome::Fallback(episode) => fallbacks.push(episode),
            }
        }

        playable.retain(|episode| is_manifest_url(&episode.url));
        let episodes = if playable.is_empty() && !fallbacks.is_empty() {
            // Better than nothing: hand the client the page URLs even
            // though they may not be directly playable.
            warn!(
                source = source_name,
                id,
                count = fallbacks.len(),
                "no direct manifests recovered, returning page fallbacks"
            );
            fallbacks
        } else {
            playable
        };

        Ok(DetailResponse {
            code: 0,
            title,
            episodes,
        })
    }

    /// Escalates a non-manifest episode URL to a page scrape.
    async fn resolve_episode(&self, episode: Episode) -> EpisodeOutcome {
        if is_manifest_url(&episode.url) {
            return EpisodeOutcome::Playable(episode);
        }
        match extract_manifest_url(self.fetch.as_ref(), &episode.url).await {
            Some(found) => EpisodeOutcome::Playable(Episode {
                name: episode.name,
                url: found,
            }),
            None => EpisodeOutcome::Fallback(episode),
        }
    }
}
