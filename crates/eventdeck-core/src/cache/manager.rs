use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Event;
use crate::storage::KeyValueStore;

/// Storage key of the cached event snapshot.
pub const CACHE_KEY: &str = "events_cache";

/// Snapshots older than this are ignored by `get`.
pub const CACHE_TTL_MINUTES: i64 = 30;

const CACHE_TTL_MS: i64 = CACHE_TTL_MINUTES * 60 * 1000;

/// Persisted shape of the cache slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub events: Vec<Event>,
    /// Epoch milliseconds at which the snapshot was written.
    pub timestamp: i64,
}

impl CacheRecord {
    pub fn age_at(&self, now_ms: i64) -> Duration {
        // Clamped to the range chrono accepts (i64::MIN is out of bounds)
        Duration::milliseconds(now_ms.saturating_sub(self.timestamp).max(-i64::MAX))
    }

    /// A timestamp too far from `now_ms` to subtract is never fresh.
    pub fn is_fresh_at(&self, now_ms: i64) -> bool {
        now_ms
            .checked_sub(self.timestamp)
            .is_some_and(|age_ms| age_ms <= CACHE_TTL_MS)
    }
}

/// Render an age as "just now", "5m ago", "2h ago" or "3d ago".
pub fn age_display(age: Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        // Negative ages (clock skew) land here too
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        let remaining_mins = minutes % 60;
        if remaining_mins >= 30 {
            // Round up: 1h 30m+ becomes 2h
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        let remaining_hours = (minutes % 1440) / 60;
        if remaining_hours >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// TTL'd event snapshot over a single storage slot.
///
/// Reads never fail: a missing, unreadable or malformed record is simply a
/// miss. Writes are best-effort and never propagate storage errors.
#[derive(Clone)]
pub struct EventCache {
    store: Arc<dyn KeyValueStore>,
}

impl EventCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read_record(&self) -> Option<CacheRecord> {
        let raw = match self.store.get(CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(key = CACHE_KEY, error = %e, "Failed to read cache slot");
                return None;
            }
        };

        match serde_json::from_str::<CacheRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(key = CACHE_KEY, error = %e, "Ignoring malformed cache record");
                None
            }
        }
    }

    /// Cached events if a fresh snapshot exists.
    pub fn get(&self) -> Option<Vec<Event>> {
        self.get_at(Utc::now().timestamp_millis())
    }

    pub(crate) fn get_at(&self, now_ms: i64) -> Option<Vec<Event>> {
        let record = self.read_record()?;
        if record.is_fresh_at(now_ms) {
            Some(record.events)
        } else {
            debug!(age_ms = now_ms.saturating_sub(record.timestamp), "Cache record expired");
            None
        }
    }

    /// Cached events regardless of age; empty when nothing usable is stored.
    pub fn get_stale(&self) -> Vec<Event> {
        self.read_record().map(|r| r.events).unwrap_or_default()
    }

    /// Store a fresh snapshot. Failures are logged and swallowed.
    pub fn set(&self, events: &[Event]) {
        self.set_at(events, Utc::now().timestamp_millis());
    }

    pub(crate) fn set_at(&self, events: &[Event], now_ms: i64) {
        let record = CacheRecord {
            events: events.to_vec(),
            timestamp: now_ms,
        };
        let contents = match serde_json::to_string(&record) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cache record");
                return;
            }
        };
        if let Err(e) = self.store.set(CACHE_KEY, &contents) {
            warn!(key = CACHE_KEY, error = %e, "Failed to write cache, continuing without it");
        }
    }

    /// Age of the stored snapshot, fresh or not.
    pub fn age(&self) -> Option<Duration> {
        self.read_record()
            .map(|r| r.age_at(Utc::now().timestamp_millis()))
    }

    /// "never" when nothing is cached.
    pub fn age_display(&self) -> String {
        self.age()
            .map(age_display)
            .unwrap_or_else(|| "never".to_string())
    }

    pub fn is_stale(&self) -> bool {
        self.get().is_none()
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(CACHE_KEY) {
            warn!(key = CACHE_KEY, error = %e, "Failed to clear cache");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    fn sample_events() -> Vec<Event> {
        vec![
            Event::from_raw("evt-1".into(), "Foo", Some("film"), None, Some("Bar"), None).unwrap(),
            Event::from_raw("evt-2".into(), "Baz", Some("koncert"), Some("2024-01-01"), None, None)
                .unwrap(),
        ]
    }

    fn cache_with(store: Arc<dyn KeyValueStore>) -> EventCache {
        EventCache::new(store)
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
    }

    #[test]
    fn test_get_empty_store_is_miss() {
        let cache = cache_with(Arc::new(MemoryStore::new()));
        assert!(cache.get().is_none());
        assert!(cache.get_stale().is_empty());
        assert_eq!(cache.age_display(), "never");
    }

    #[test]
    fn test_set_then_get() {
        let cache = cache_with(Arc::new(MemoryStore::new()));
        cache.set(&sample_events());
        assert_eq!(cache.get(), Some(sample_events()));
        assert!(!cache.is_stale());
        assert_eq!(cache.age_display(), "just now");
    }

    #[test]
    fn test_ttl_boundary() {
        let cache = cache_with(Arc::new(MemoryStore::new()));
        let now = 1_700_000_000_000;

        cache.set_at(&sample_events(), now - CACHE_TTL_MS - 1);
        assert!(cache.get_at(now).is_none());

        cache.set_at(&sample_events(), now - CACHE_TTL_MS + 1);
        assert_eq!(cache.get_at(now), Some(sample_events()));

        cache.set_at(&sample_events(), now - CACHE_TTL_MS);
        assert!(cache.get_at(now).is_some());
    }

    #[test]
    fn test_get_stale_ignores_ttl() {
        let cache = cache_with(Arc::new(MemoryStore::new()));
        cache.set_at(&sample_events(), 0);
        assert!(cache.get().is_none());
        assert_eq!(cache.get_stale(), sample_events());
        assert!(cache.is_stale());
    }

    #[test]
    fn test_malformed_record_is_miss() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(store.clone());

        store.set(CACHE_KEY, "{not json").unwrap();
        assert!(cache.get().is_none());
        assert!(cache.get_stale().is_empty());

        // Well-formed JSON with missing fields is also a miss
        store.set(CACHE_KEY, r#"{"events": []}"#).unwrap();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_extreme_timestamp_is_miss() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(store.clone());

        store
            .set(CACHE_KEY, r#"{"events": [], "timestamp": -9223372036854775808}"#)
            .unwrap();
        assert!(cache.get().is_none());
        assert!(cache.is_stale());
        assert!(cache.get_stale().is_empty());
        assert!(cache.age().is_some());
        assert!(cache.age_display().ends_with("d ago"));

        let future = CacheRecord {
            events: Vec::new(),
            timestamp: i64::MAX,
        };
        assert!(future.age_at(-1).num_milliseconds() < 0);
        assert!(!CacheRecord { events: Vec::new(), timestamp: i64::MIN }.is_fresh_at(1));
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        let cache = cache_with(Arc::new(FailingStore));
        cache.set(&sample_events());
        cache.clear();
        assert!(cache.get().is_none());
        assert!(cache.get_stale().is_empty());
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_snapshot() {
        let store = Arc::new(MemoryStore::with_quota(400));
        let cache = cache_with(store);
        cache.set(&sample_events()[..1]);

        let big: Vec<Event> = (0..50)
            .map(|i| {
                Event::from_raw(format!("evt-{}", i), "Long event name", None, None, None, None)
                    .unwrap()
            })
            .collect();
        cache.set(&big);

        assert_eq!(cache.get(), Some(sample_events()[..1].to_vec()));
    }

    #[test]
    fn test_clear() {
        let cache = cache_with(Arc::new(MemoryStore::new()));
        cache.set(&sample_events());
        cache.clear();
        assert!(cache.get_stale().is_empty());
    }

    #[test]
    fn test_age_display() {
        assert_eq!(age_display(Duration::seconds(20)), "just now");
        assert_eq!(age_display(Duration::minutes(-5)), "just now");
        assert_eq!(age_display(Duration::minutes(5)), "5m ago");
        assert_eq!(age_display(Duration::minutes(90)), "2h ago");
        assert_eq!(age_display(Duration::minutes(70)), "1h ago");
        assert_eq!(age_display(Duration::hours(36)), "2d ago");
        assert_eq!(age_display(Duration::hours(30)), "1d ago");
    }
}
