//! Federated search across every configured source.
//!
//! One concurrent task per source, all racing under a mode-specific
//! deadline. A source failing, answering garbage, or timing out never fails
//! the whole search; it just contributes nothing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use driftnet_core::cache::TtlCache;
use driftnet_core::catalog::{SourceCatalog, SourceDefinition};
use driftnet_core::config::SearchConfig;
use driftnet_core::fetch::Fetch;

use crate::errors::SearchError;
use crate::extract::{extract_entries, normalize_entry};
use crate::types::{CatalogItem, SearchMode, SearchResponse};

/// Orchestrates the per-source search tasks, deduplication, and caching.
///
/// The cache is injected, not a process-wide singleton; writes are
/// idempotent last-writer-wins, so two identical in-flight queries racing
/// each other is harmless.
#[derive(Debug)]
pub struct SearchAggregator {
    catalog: Arc<SourceCatalog>,
    fetch: Arc<dyn Fetch>,
    cache: Arc<TtlCache<SearchResponse>>,
    config: SearchConfig,
}

impl SearchAggregator {
    /// Creates an aggregator over the given catalog and fetch seam.
    pub fn new(
        catalog: Arc<SourceCatalog>,
        fetch: Arc<dyn Fetch>,
        cache: Arc<TtlCache<SearchResponse>>,
        config: SearchConfig,
    ) -> Self {
        Self {
            catalog,
            fetch,
            cache,
            config,
        }
    }

    /// Runs one federated search.
    ///
    /// Returns the cached response unchanged when a live entry exists for
    /// `mode + query`; otherwise fans out, deduplicates by `(title, cover)`
    /// in first-seen order, and caches the outcome. Combined result order is
    /// catalog-declaration order, then per-source response order, regardless
    /// of task completion order.
    ///
    /// # Errors
    /// - `SearchError::EmptyQuery` - Query was empty after trimming; the
    ///   only input this operation rejects. Zero upstream hits are an empty
    ///   success, never an error.
    pub async fn search(&self, query: &str, mode: SearchMode) -> Result<SearchResponse, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let cache_key = format!("{}:{}", mode.as_str(), query);
        if let Some(cached) = self.cache.get(&cache_key) {
            debug!(query, mode = mode.as_str(), "search cache hit");
            return Ok(cached);
        }

        let started = Instant::now();
        let (deadline, ttl) = match mode {
            SearchMode::Fast => (self.config.fast_deadline, self.config.fast_cache_ttl),
            SearchMode::Full => (self.config.full_deadline, self.config.full_cache_ttl),
        };

        let sources = self.catalog.sources();
        let mut tasks: FuturesUnordered<_> = sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                let fetch = Arc::clone(&self.fetch);
                let cap = self.config.per_source_cap;
                async move { (index, search_one_source(fetch.as_ref(), source, query, cap).await) }
            })
            .collect();

        let deadline_at = tokio::time::Instant::now() + deadline;
        let mut per_source: Vec<Vec<CatalogItem>> = vec![Vec::new(); sources.len()];
        let mut productive_sources = 0usize;

        loop {
            match tokio::time::timeout_at(deadline_at, tasks.next()).await {
                Ok(Some((index, items))) => {
                    if !items.is_empty() {
                        productive_sources += 1;
                    }
                    per_source[index] = items;
                    if mode == SearchMode::Fast
                        && productive_sources >= self.config.fast_source_quorum
                    {
                        debug!(query, productive_sources, "fast quorum reached");
                        break;
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    debug!(query, mode = mode.as_str(), "search deadline elapsed");
                    break;
                }
            }
        }
        // Dropping the set cancels any in-flight stragglers.
        drop(tasks);

        let list = dedupe(per_source.into_iter().flatten());
        let response = SearchResponse {
            code: 0,
            took_ms: started.elapsed().as_millis() as u64,
            count: list.len(),
            list,
        };
        self.cache.insert(cache_key, response.clone(), ttl);

        info!(
            query,
            mode = mode.as_str(),
            count = response.count,
            took_ms = response.took_ms,
            "search complete"
        );
        Ok(response)
    }
}

/// Tries a source's search templates in declared order, stopping at the
/// first template whose response yields a non-empty normalized list.
async fn search_one_source(
    fetch: &dyn Fetch,
    source: &SourceDefinition,
    query: &str,
    cap: usize,
) -> Vec<CatalogItem> {
    for url in source.search_urls(query) {
        match fetch.fetch_json(&url).await {
            Ok(payload) => {
                let entries = extract_entries(&payload);
                if entries.is_empty() {
                    continue;
                }
                return entries
                    .iter()
                    .take(cap)
                    .map(|entry| normalize_entry(entry, source))
                    .collect();
            }
            Err(error) => {
                debug!(source = %source.name, %url, %error, "search attempt failed");
            }
        }
    }
    Vec::new()
}

/// Collapses entries sharing a `(title, cover)` key, keeping the
/// first-encountered source's fields.
fn dedupe(items: impl IntoIterator<Item = CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert((item.title.clone(), item.cover.clone())) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(source: &str, title: &str, cover: &str) -> CatalogItem {
        CatalogItem {
            source: source.to_string(),
            title: title.to_string(),
            cover: cover.to_string(),
            year: String::new(),
            category: String::new(),
            remarks: String::new(),
            id: format!("{source}-{title}"),
        }
    }

    #[test]
    fn test_dedupe_collapses_on_title_and_cover() {
        let deduped = dedupe(vec![
            item("a", "Movie", "https://x/c.jpg"),
            item("b", "Movie", "https://x/c.jpg"),
            item("b", "Movie", "https://x/other.jpg"),
        ]);

        assert_eq!(deduped.len(), 2);
        // First-encountered source's fields are retained
        assert_eq!(deduped[0].source, "a");
        assert_eq!(deduped[1].cover, "https://x/other.jpg");
    }

    #[test]
    fn test_dedupe_preserves_first_seen_order() {
        let deduped = dedupe(vec![
            item("a", "One", ""),
            item("a", "Two", ""),
            item("b", "One", ""),
            item("b", "Three", ""),
        ]);

        let titles: Vec<&str> = deduped.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two", "Three"]);
    }
}
