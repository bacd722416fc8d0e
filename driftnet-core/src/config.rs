//! Centralized configuration for Driftnet.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::net::SocketAddr;
use std::time::Duration;

/// Central configuration for all Driftnet components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct DriftnetConfig {
    /// Outbound HTTP client settings
    pub http: HttpConfig,
    /// Search aggregation policy
    pub search: SearchConfig,
    /// HTTP server settings
    pub server: ServerConfig,
}

/// Outbound HTTP client configuration.
///
/// Controls the request identity and per-call timeout used for every
/// upstream fetch. Upstream sites reject requests that do not look like a
/// browser, so the identity values are functional, not cosmetic.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Browser-like User-Agent sent on every upstream request
    pub user_agent: &'static str,
    /// Per-call timeout for a single upstream request
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124 Safari/537.36",
            request_timeout: Duration::from_secs(8),
        }
    }
}

/// Search aggregation policy.
///
/// Deadlines bound the whole fan-out, independently of the per-call
/// timeout in [`HttpConfig`]. Cache TTLs are short enough to reflect
/// upstream churn, long enough to absorb repeat typeahead traffic.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Overall ceiling for fast-mode aggregation
    pub fast_deadline: Duration,
    /// Overall ceiling for full-mode aggregation
    pub full_deadline: Duration,
    /// Fast mode stops waiting once this many sources produced results
    pub fast_source_quorum: usize,
    /// Maximum accepted items per source
    pub per_source_cap: usize,
    /// Cache TTL for fast-mode responses
    pub fast_cache_ttl: Duration,
    /// Cache TTL for full-mode responses
    pub full_cache_ttl: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fast_deadline: Duration::from_millis(2500),
            full_deadline: Duration::from_secs(7),
            fast_source_quorum: 2,
            per_source_cap: 20,
            fast_cache_ttl: Duration::from_secs(20),
            full_cache_ttl: Duration::from_secs(60),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the API and relay server binds to
    pub bind_address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl DriftnetConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("DRIFTNET_REQUEST_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.http.request_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(deadline) = std::env::var("DRIFTNET_FAST_DEADLINE_MS") {
            if let Ok(millis) = deadline.parse::<u64>() {
                config.search.fast_deadline = Duration::from_millis(millis);
            }
        }

        if let Ok(deadline) = std::env::var("DRIFTNET_FULL_DEADLINE_MS") {
            if let Ok(millis) = deadline.parse::<u64>() {
                config.search.full_deadline = Duration::from_millis(millis);
            }
        }

        if let Ok(bind) = std::env::var("DRIFTNET_BIND") {
            if let Ok(address) = bind.parse::<SocketAddr>() {
                config.server.bind_address = address;
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Short deadlines and TTLs so cache-expiry and deadline behavior can be
    /// exercised without multi-second sleeps.
    pub fn for_testing() -> Self {
        Self {
            http: HttpConfig {
                request_timeout: Duration::from_millis(500),
                ..HttpConfig::default()
            },
            search: SearchConfig {
                fast_deadline: Duration::from_millis(200),
                full_deadline: Duration::from_millis(400),
                fast_cache_ttl: Duration::from_millis(50),
                full_cache_ttl: Duration::from_millis(50),
                ..SearchConfig::default()
            },
            server: ServerConfig::default(),
        }
    }
}
