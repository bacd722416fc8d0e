//! Wire types shared by the search and detail operations.

use serde::{Deserialize, Serialize};

/// One normalized catalog entry produced by the aggregator.
///
/// Identity for deduplication is the `(title, cover)` pair, not
/// `(source, id)`, so identical titles surfaced by different sources
/// collapse into one card. `cover` is always absolute or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Name of the source that produced this entry
    pub source: String,
    /// Display title
    pub title: String,
    /// Absolutized cover image URL, empty when the source has none
    pub cover: String,
    /// Release year as published by the source
    pub year: String,
    /// Source-specific category label
    #[serde(rename = "type")]
    pub category: String,
    /// Free-text remarks (episode count, freshness, ...)
    pub remarks: String,
    /// Source-local identifier used for detail lookups
    pub id: String,
}

/// A single playable episode.
///
/// An empty `url` is the sentinel for "resolution failed"; consumers filter
/// those out unless the fallback-page policy kicks in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Display name of the episode
    pub name: String,
    /// Absolute stream URL, or empty when unresolved
    pub url: String,
}

/// Aggregated search response, also the cached value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Always 0; failures are expressed as an empty list
    pub code: u16,
    /// Wall-clock time the aggregation took
    #[serde(rename = "tookMs")]
    pub took_ms: u64,
    /// Number of entries in `list`
    pub count: usize,
    /// Deduplicated results in catalog-declaration order
    pub list: Vec<CatalogItem>,
}

/// Resolved detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    /// Always 0; an unresolvable title yields an empty episode list
    pub code: u16,
    /// Title as published by the source
    pub title: String,
    /// Playable episodes, or fallback page references
    pub episodes: Vec<Episode>,
}

/// Search latency policy.
///
/// Fast trades completeness for latency: it stops waiting once a quorum of
/// sources answered. Full settles every source under a longer ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Latency-bounded aggregation with a source quorum short-circuit
    Fast,
    /// Await every source under the overall ceiling
    #[default]
    Full,
}

impl SearchMode {
    /// Parses a request parameter; anything other than `fast` means full.
    pub fn from_param(value: &str) -> Self {
        if value.eq_ignore_ascii_case("fast") {
            Self::Fast
        } else {
            Self::Full
        }
    }

    /// Stable lowercase name, used in cache keys and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Full => "full",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing_defaults_to_full() {
        assert_eq!(SearchMode::from_param("fast"), SearchMode::Fast);
        assert_eq!(SearchMode::from_param("FAST"), SearchMode::Fast);
        assert_eq!(SearchMode::from_param("full"), SearchMode::Full);
        assert_eq!(SearchMode::from_param("anything"), SearchMode::Full);
        assert_eq!(SearchMode::from_param(""), SearchMode::Full);
    }

    #[test]
    fn test_response_serializes_external_field_names() {
        let response = SearchResponse {
            code: 0,
            took_ms: 12,
            count: 0,
            list: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["tookMs"], 12);
        assert!(json.get("took_ms").is_none());
    }

    #[test]
    fn test_catalog_item_type_field_name() {
        let item = CatalogItem {
            source: "demo".into(),
            title: "T".into(),
            cover: String::new(),
            year: "2024".into(),
            category: "movie".into(),
            remarks: String::new(),
            id: "1".into(),
        };
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["type"], "movie");
        assert!(json.get("category").is_none());
    }
}
