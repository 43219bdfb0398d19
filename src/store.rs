//! Key-value storage for application state (onboarding flags, cached records)

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// String key-value store with optional per-entry expiry.
pub trait KeyValueStore {
    fn get(&mut self, key: &str) -> Option<String>;

    /// Stores `value`, replacing any previous entry. `None` never expires.
    fn put(&mut self, key: &str, value: String, ttl: Option<Duration>);

    fn delete(&mut self, key: &str);
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not expired
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries.values().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&mut self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(Utc::now()) {
            self.entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// A TTL past the representable date range never expires, or is already
    /// expired when negative.
    fn put(&mut self, key: &str, value: String, ttl: Option<Duration>) {
        let now = Utc::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let expires_at = match ttl {
            None => None,
            Some(ttl) => match now.checked_add_signed(ttl) {
                Some(at) => Some(at),
                None if ttl < Duration::zero() => Some(now),
                None => None,
            },
        };
        self.entries.insert(key.to_string(), Entry { value, expires_at });
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("missing"), None);

        store.put("onboarding:done", "true".to_string(), None);
        assert_eq!(store.get("onboarding:done").as_deref(), Some("true"));
        assert_eq!(store.len(), 1);

        store.put("onboarding:done", "false".to_string(), None);
        assert_eq!(store.get("onboarding:done").as_deref(), Some("false"));
        assert_eq!(store.len(), 1);

        store.delete("onboarding:done");
        assert_eq!(store.get("onboarding:done"), None);
        // deleting twice is fine
        store.delete("onboarding:done");
    }

    #[test]
    fn test_ttl_expiry() {
        let mut store = MemoryStore::new();
        store.put("expired", "x".to_string(), Some(Duration::zero()));
        store.put("negative", "x".to_string(), Some(Duration::seconds(-5)));
        store.put("live", "y".to_string(), Some(Duration::hours(1)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("expired"), None);
        assert_eq!(store.get("negative"), None);
        assert_eq!(store.get("live").as_deref(), Some("y"));
        // expired entries are purged on put and on read
        assert_eq!(store.entries.len(), 1);
    }

    #[test]
    fn test_ttl_out_of_range() {
        let mut store = MemoryStore::new();
        store.put("forever", "x".to_string(), Some(Duration::MAX));
        store.put("past", "y".to_string(), Some(Duration::MIN));
        assert_eq!(store.get("forever").as_deref(), Some("x"));
        assert_eq!(store.get("past"), None);
    }

    #[test]
    fn test_put_prunes_expired_entries() {
        let mut store = MemoryStore::new();
        store.put("stale:1", "x".to_string(), Some(Duration::zero()));
        store.put("stale:2", "x".to_string(), Some(Duration::seconds(-1)));
        store.put("fresh", "y".to_string(), None);
        assert_eq!(store.entries.len(), 1);
        assert!(store.entries.contains_key("fresh"));
    }
}
