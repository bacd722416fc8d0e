//! Process-lifetime TTL cache with lazy expiry.
//!
//! Entries are garbage-collected on the next read of the same key, never
//! proactively swept. The key space stays bounded because only queries users
//! actually typed become keys. Writes are idempotent last-writer-wins, so
//! duplicate concurrent fills of the same key are harmless.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Key-value store whose entries expire after a per-insert TTL.
///
/// Shared behind an `Arc` and injected into its consumers; there is no
/// process-wide singleton.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a live value for the key, removing it if expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a value that expires `ttl` from now, replacing any previous
    /// entry for the key.
    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.into(), entry);
    }

    /// Number of stored entries, including not-yet-collected expired ones.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = TtlCache::new();
        cache.insert("full:query", 42u64, Duration::from_secs(60));

        assert_eq!(cache.get("full:query"), Some(42));
        assert_eq!(cache.get("fast:query"), None);
    }

    #[test]
    fn test_expired_entry_removed_on_read() {
        let cache = TtlCache::new();
        cache.insert("key", 1u64, Duration::from_millis(10));
        assert_eq!(cache.len(), 1);

        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.get("key"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_overwrites() {
        let cache = TtlCache::new();
        cache.insert("key", 1u64, Duration::from_secs(60));
        cache.insert("key", 2u64, Duration::from_secs(60));

        assert_eq!(cache.get("key"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reinsert_after_expiry_revives_key() {
        let cache = TtlCache::new();
        cache.insert("key", 1u64, Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(10));
        cache.insert("key", 2u64, Duration::from_secs(60));

        assert_eq!(cache.get("key"), Some(2));
    }
}
