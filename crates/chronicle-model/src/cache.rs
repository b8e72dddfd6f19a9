//! Bounded response cache with time-based expiry and LRU eviction.
//!
//! Expiry is evaluated lazily on read only; there is no sweeping task. An
//! expired-but-unread entry still occupies capacity and may be evicted by
//! the LRU policy before a read would have expired it.

use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct CacheEntry {
    value: Value,
    created_at: Instant,
    last_accessed: Instant,
}

/// Key -> value store capped at `max_size` entries with per-entry TTL.
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    max_size: usize,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_size,
            ttl,
        }
    }

    /// Look up a key. Expired entries are removed and reported absent; a
    /// hit refreshes the entry's last-accessed time.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => now.duration_since(entry.created_at) > self.ttl,
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        let entry = self.entries.get_mut(key)?;
        entry.last_accessed = now;
        Some(entry.value.clone())
    }

    /// Insert a value. At capacity, the entry with the globally minimum
    /// last-accessed time is evicted first (ties: first found in iteration
    /// order). Insertion always records fresh timestamps.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.set_at(key, value, Instant::now())
    }

    pub(crate) fn set_at(&mut self, key: impl Into<String>, value: Value, now: Instant) {
        let key = key.into();
        if self.entries.len() >= self.max_size && !self.entries.contains_key(&key) {
            if let Some(lru_key) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&lru_key);
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
                last_accessed: now,
            },
        );
    }

    /// Drop all entries unconditionally.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
