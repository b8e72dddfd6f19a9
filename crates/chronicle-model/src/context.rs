//! Short-lived context retention.
//!
//! Unlike the response cache, records are never refreshed on read and age
//! is only enforced by an explicit sweep: callers that rely on stale
//! contexts disappearing must run [`ContextStore::clear_old`] themselves.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;

struct ContextRecord {
    payload: Value,
    created_at: DateTime<Utc>,
}

/// Identifier -> opaque timestamped payload.
#[derive(Default)]
pub struct ContextStore {
    entries: HashMap<String, ContextRecord>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, id: impl Into<String>, payload: Value) {
        self.store_at(id, payload, Utc::now())
    }

    pub(crate) fn store_at(&mut self, id: impl Into<String>, payload: Value, now: DateTime<Utc>) {
        self.entries.insert(
            id.into(),
            ContextRecord {
                payload,
                created_at: now,
            },
        );
    }

    /// Fetch a payload. Age is not checked here; a record past the
    /// threshold is still returned until a sweep removes it.
    pub fn get(&self, id: &str) -> Option<Value> {
        self.entries.get(id).map(|record| record.payload.clone())
    }

    /// Remove records older than `max_age`, returning how many went.
    pub fn clear_old(&mut self, max_age: Duration) -> usize {
        self.clear_old_at(max_age, Utc::now())
    }

    pub(crate) fn clear_old_at(&mut self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - max_age;
        let before = self.entries.len();
        self.entries.retain(|_, record| record.created_at >= cutoff);
        before - self.entries.len()
    }

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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_and_get() {
        let mut store = ContextStore::new();
        store.store("session-1", json!({"turn": 3}));
        assert_eq!(store.get("session-1"), Some(json!({"turn": 3})));
        assert!(store.get("session-2").is_none());
    }

    #[test]
    fn test_stale_record_survives_until_sweep() {
        let mut store = ContextStore::new();
        let old = Utc::now() - Duration::hours(48);
        store.store_at("stale", json!("payload"), old);

        // No sweep has run: the stale record is still readable.
        assert_eq!(store.get("stale"), Some(json!("payload")));

        let removed = store.clear_old(Duration::hours(24));
        assert_eq!(removed, 1);
        assert!(store.get("stale").is_none());
    }

    #[test]
    fn test_sweep_keeps_fresh_records() {
        let mut store = ContextStore::new();
        let now = Utc::now();
        store.store_at("old", json!(1), now - Duration::hours(30));
        store.store_at("fresh", json!(2), now - Duration::hours(1));

        let removed = store.clear_old_at(Duration::hours(24), now);
        assert_eq!(removed, 1);
        assert!(store.get("fresh").is_some());
        assert_eq!(store.len(), 1);
    }
}
