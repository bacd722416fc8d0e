//! URL absolutization shared by covers, episode URLs, and the relay.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static MANIFEST_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.m3u8(\?.*)?$").unwrap());

/// Returns true when a string already carries an http(s) scheme.
pub fn has_http_scheme(candidate: &str) -> bool {
    let lower = candidate.get(..8).unwrap_or(candidate).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Returns true when the URL ends in `.m3u8`, optionally followed by a
/// query string.
///
/// Used both as the "already a manifest" check during episode resolution and
/// as the relay's mislabeled-manifest hint.
pub fn is_manifest_url(url: &str) -> bool {
    MANIFEST_SUFFIX.is_match(url)
}

/// Resolves a possibly-relative URL against a source's base origin.
///
/// Already-absolute URLs pass through unchanged, protocol-relative
/// (`//host/...`) URLs get an `https:` prefix, and everything else resolves
/// against the base. The result is always an absolute `http(s)` URL or the
/// empty string, never a bare relative path.
pub fn absolutize(raw: &str, base: &Url) -> String {
    let candidate = raw.trim();
    if candidate.is_empty() {
        return String::new();
    }
    if has_http_scheme(candidate) {
        return candidate.to_string();
    }
    if candidate.starts_with("//") {
        return format!("https:{candidate}");
    }
    match base.join(candidate) {
        Ok(resolved) => resolved.into(),
        // Join only fails for degenerate bases; fall back to origin concat
        Err(_) => {
            let origin = base.origin().ascii_serialization();
            if candidate.starts_with('/') {
                format!("{origin}{candidate}")
            } else {
                format!("{origin}/{candidate}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://site.com").unwrap()
    }

    #[test]
    fn test_absolute_url_passes_through() {
        assert_eq!(
            absolutize("https://cdn.example.com/a.jpg", &base()),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            absolutize("HTTP://cdn.example.com/a.jpg", &base()),
            "HTTP://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn test_absolutize_is_idempotent() {
        let once = absolutize("/upload/x.jpg", &base());
        assert_eq!(absolutize(&once, &base()), once);
    }

    #[test]
    fn test_protocol_relative_gets_https() {
        assert_eq!(absolutize("//cdn/x.jpg", &base()), "https://cdn/x.jpg");
    }

    #[test]
    fn test_relative_paths_resolve_against_base() {
        assert_eq!(
            absolutize("/upload/x.jpg", &base()),
            "https://site.com/upload/x.jpg"
        );
        assert_eq!(
            absolutize("upload/x.jpg", &base()),
            "https://site.com/upload/x.jpg"
        );
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(absolutize("", &base()), "");
        assert_eq!(absolutize("   ", &base()), "");
    }

    #[test]
    fn test_manifest_url_detection() {
        assert!(is_manifest_url("https://h/a/index.m3u8"));
        assert!(is_manifest_url("https://h/a/index.M3U8"));
        assert!(is_manifest_url("https://h/a/index.m3u8?token=1"));
        assert!(!is_manifest_url("https://h/a/index.m3u8.html"));
        assert!(!is_manifest_url("https://h/a/page.html"));
    }
}
