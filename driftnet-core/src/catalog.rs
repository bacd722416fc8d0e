//! Static catalog of upstream sources.
//!
//! A source is pure data: a display name, a base origin, and the URL
//! templates for its capabilities. All shape handling lives in the search
//! crate; nothing here branches on source identity.

use serde::Deserialize;
use url::Url;

use crate::{DriftnetError, Result};

/// One independently operated upstream catalog.
///
/// `search_templates` are tried in declared order; the order encodes a
/// preference for richer data (a suggest endpoint with covers before the
/// plain list endpoint), not just availability. Templates carry a `{query}`
/// placeholder, the detail template an `{id}` placeholder.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefinition {
    /// Unique display name, also the `source` key in API responses
    pub name: String,
    /// Base origin all templates and relative URLs resolve against
    pub base: Url,
    /// Search URL templates in preference order, `{query}` placeholder
    pub search_templates: Vec<String>,
    /// Detail URL template, `{id}` placeholder
    pub detail_template: String,
}

impl SourceDefinition {
    /// Expands the search templates for a query, preserving declared order.
    pub fn search_urls(&self, query: &str) -> Vec<String> {
        let encoded = urlencoding::encode(query);
        self.search_templates
            .iter()
            .map(|template| self.expand(template, "{query}", &encoded))
            .collect()
    }

    /// Expands the detail template for a catalog entry id.
    pub fn detail_url(&self, id: &str) -> String {
        self.expand(&self.detail_template, "{id}", &urlencoding::encode(id))
    }

    fn expand(&self, template: &str, placeholder: &str, value: &str) -> String {
        format!(
            "{}{}",
            self.base.as_str().trim_end_matches('/'),
            template.replace(placeholder, value)
        )
    }
}

/// Immutable, ordered collection of source definitions.
///
/// Loaded once at process start and shared behind an `Arc`. Lookup is a
/// linear scan over a small fixed set.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    sources: Vec<SourceDefinition>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    sources: Vec<SourceDefinition>,
}

impl SourceCatalog {
    /// Creates a catalog from explicit definitions.
    pub fn new(sources: Vec<SourceDefinition>) -> Self {
        Self { sources }
    }

    /// The compiled-in federation list.
    pub fn builtin() -> Self {
        const SUGGEST: &str = "/index.php/ajax/suggest?mid=1&wd={query}";
        const LIST: &str = "/api.php/provide/vod/?ac=list&wd={query}";
        const DETAIL: &str = "/api.php/provide/vod/?ac=detail&ids={id}";

        let entry = |name: &str, base: &str| SourceDefinition {
            name: name.to_string(),
            base: Url::parse(base).unwrap(),
            search_templates: vec![SUGGEST.to_string(), LIST.to_string()],
            detail_template: DETAIL.to_string(),
        };

        Self::new(vec![
            entry("tiantian", "https://www.tttv01.com"),
            entry("miaokan", "https://miaokan.cc"),
            entry("hddy", "https://www.hd-dy.cc"),
            entry("qqys", "https://qqqys.com"),
            entry("xiaohong", "https://www.xiaohys.com"),
        ])
    }

    /// Parses a catalog from TOML text.
    ///
    /// # Errors
    /// - `DriftnetError::Catalog` - Malformed TOML or an empty source list
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| DriftnetError::Catalog {
            reason: format!("invalid catalog file: {e}"),
        })?;
        if file.sources.is_empty() {
            return Err(DriftnetError::Catalog {
                reason: "catalog file defines no sources".to_string(),
            });
        }
        Ok(Self::new(file.sources))
    }

    /// Loads an operator-provided catalog override from a TOML file.
    ///
    /// # Errors
    /// - `DriftnetError::Io` - File could not be read
    /// - `DriftnetError::Catalog` - Malformed TOML or an empty source list
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// All sources in declaration order.
    pub fn sources(&self) -> &[SourceDefinition] {
        &self.sources
    }

    /// Looks up a source by its display name.
    pub fn find(&self, name: &str) -> Option<&SourceDefinition> {
        self.sources.iter().find(|source| source.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = SourceCatalog::builtin();

        assert!(!catalog.sources().is_empty());
        for source in catalog.sources() {
            assert_eq!(source.search_templates.len(), 2);
            assert!(source.search_templates[0].contains("{query}"));
            assert!(source.detail_template.contains("{id}"));
        }
    }

    #[test]
    fn test_find_by_name() {
        let catalog = SourceCatalog::builtin();

        assert!(catalog.find("miaokan").is_some());
        assert!(catalog.find("nonexistent").is_none());
    }

    #[test]
    fn test_template_expansion_encodes_query() {
        let catalog = SourceCatalog::builtin();
        let source = &catalog.sources()[0];

        let urls = source.search_urls("hello world");
        assert_eq!(urls.len(), 2);
        assert!(urls[0].starts_with("https://"));
        assert!(urls[0].contains("wd=hello%20world"));
        assert!(!urls[0].contains("{query}"));

        let detail = source.detail_url("42");
        assert!(detail.contains("ids=42"));
    }

    #[test]
    fn test_catalog_from_toml() {
        let text = r#"
            [[sources]]
            name = "demo"
            base = "https://demo.example.com"
            search_templates = ["/search?wd={query}"]
            detail_template = "/detail?ids={id}"
        "#;

        let catalog = SourceCatalog::from_toml_str(text).unwrap();
        assert_eq!(catalog.sources().len(), 1);
        assert_eq!(catalog.sources()[0].name, "demo");
        assert_eq!(
            catalog.sources()[0].search_urls("x")[0],
            "https://demo.example.com/search?wd=x"
        );
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(SourceCatalog::from_toml_str("sources = []").is_err());
        assert!(SourceCatalog::from_toml_str("not toml at all [").is_err());
    }
}
