//! TTL-bounded cache for computed statistics.
//!
//! One entry per key. An entry expires a fixed TTL after the write that
//! created it; expiry is enforced lazily, on the read that observes it and
//! by the sweep every write triggers. All access goes through one mutex,
//! so operations are linearizable and hold the lock only briefly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Entry {
    value: Value,
    created_at: Instant,
}

pub struct StatsCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Value for `key` if present and fresh. A stale entry is evicted and
    /// reported as a miss.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    /// Insert or replace `key`, resetting its age, then evict every other
    /// entry already past the TTL.
    pub fn set(&self, key: &str, value: Value) {
        self.set_at(key, value, Instant::now());
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Entry count and sorted keys as currently stored. Does not evict;
    /// stale entries awaiting a read or a sweep still show up here.
    pub fn stats(&self) -> (usize, Vec<String>) {
        let entries = self.entries.lock().unwrap();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        (keys.len(), keys)
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.created_at) <= self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                debug!(key, "cache entry expired");
                None
            }
            None => None,
        }
    }

    fn set_at(&self, key: &str, value: Value, now: Instant) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), Entry { value, created_at: now });
        entries.retain(|_, entry| now.duration_since(entry.created_at) <= self.ttl);
    }
}

/// Cache key for a statistic kind and its query parameter. The parameter is
/// trimmed and case-folded so equivalent queries share one entry.
pub fn cache_key(kind: &str, param: &str) -> String {
    format!("{}:{}", kind, param.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hit_within_ttl() {
        let cache = StatsCache::new(Duration::from_secs(300));
        cache.set("habilidades:sistemas", json!({"total": 3}));
        assert_eq!(cache.get("habilidades:sistemas"), Some(json!({"total": 3})));
    }

    #[test]
    fn entry_expires_after_ttl_and_count_drops() {
        let cache = StatsCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.set_at("k", json!(1), t0);

        let late = t0 + Duration::from_secs(301);
        assert_eq!(cache.get_at("k", late), None);
        assert_eq!(cache.stats().0, 0);
    }

    #[test]
    fn boundary_read_at_exact_ttl_is_a_hit() {
        let cache = StatsCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.set_at("k", json!(1), t0);
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(300)), Some(json!(1)));
    }

    #[test]
    fn rewrite_resets_the_clock() {
        let cache = StatsCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.set_at("k", json!(1), t0);
        cache.set_at("k", json!(2), t0 + Duration::from_secs(200));
        // 250s after the first write, 50s after the second.
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(250)), Some(json!(2)));
    }

    #[test]
    fn write_sweeps_other_expired_entries() {
        let cache = StatsCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.set_at("old", json!(1), t0);
        cache.set_at("fresh", json!(2), t0 + Duration::from_secs(400));

        let (count, keys) = cache.stats();
        assert_eq!(count, 1);
        assert_eq!(keys, vec!["fresh"]);
    }

    #[test]
    fn eviction_on_get_touches_only_its_key() {
        let cache = StatsCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.set_at("habilidades:sistemas", json!(1), t0);
        cache.set_at("salarios:sistemas", json!(2), t0);

        assert_eq!(
            cache.get_at("habilidades:sistemas", t0 + Duration::from_secs(301)),
            None
        );
        let (count, keys) = cache.stats();
        assert_eq!(count, 1);
        assert_eq!(keys, vec!["salarios:sistemas"]);
    }

    #[test]
    fn keys_are_isolated() {
        let cache = StatsCache::default();
        cache.set("habilidades:sistemas", json!("a"));
        cache.set("salarios:sistemas", json!("b"));
        assert_eq!(cache.get("habilidades:sistemas"), Some(json!("a")));
        assert_eq!(cache.get("salarios:sistemas"), Some(json!("b")));
    }

    #[test]
    fn clear_empties_everything() {
        let cache = StatsCache::default();
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        cache.clear();
        assert_eq!(cache.stats().0, 0);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn cache_key_normalizes_the_parameter() {
        assert_eq!(cache_key("habilidades", "  SISTEMAS "), "habilidades:sistemas");
        assert_eq!(
            cache_key("salarios", "Ingeniería Civil"),
            "salarios:ingeniería civil"
        );
    }
}
