//! Persisted set of favorite event ids.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::Event;
use crate::storage::KeyValueStore;

/// Storage key of the favorites list.
pub const FAVORITES_KEY: &str = "favorites";

/// Favorite event ids in insertion order, written through to storage on every
/// change.
///
/// Ids are ordinal-derived, so after the listing reorders a favorite may
/// point at a different event.
pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
    ids: Vec<String>,
}

impl Favorites {
    /// Load the persisted list; unreadable or malformed data is an empty set.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let ids = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                debug!(error = %e, "Ignoring malformed favorites list");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!(error = %e, "Failed to read favorites");
                Vec::new()
            }
        };
        Self { store, ids }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.iter().any(|f| f == id)
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now a
    /// favorite.
    pub fn toggle(&mut self, id: &str) -> bool {
        let added = match self.ids.iter().position(|f| f == id) {
            Some(index) => {
                self.ids.remove(index);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        };
        self.persist();
        added
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Favorite events among `events`, in their original order.
    pub fn favorite_events<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        filter_favorites(events, &self.ids)
    }

    fn persist(&self) {
        let contents = match serde_json::to_string(&self.ids) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, "Failed to serialize favorites");
                return;
            }
        };
        if let Err(e) = self.store.set(FAVORITES_KEY, &contents) {
            warn!(error = %e, "Failed to save favorites");
        }
    }
}

/// Events whose id is in `ids`, preserving the order of `events`.
pub fn filter_favorites<'a, S: AsRef<str>>(events: &'a [Event], ids: &[S]) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|e| ids.iter().any(|id| id.as_ref() == e.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    fn event(id: &str) -> Event {
        Event::from_raw(id.to_string(), "Name", None, None, None, None).unwrap()
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(Some(r#"["evt-1"]"#.to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::QuotaExceeded { needed: 1, available: 0 })
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_toggle_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = Favorites::open(store.clone());

        assert!(!favorites.is_favorite("evt-1"));
        assert!(favorites.toggle("evt-1"));
        assert!(favorites.is_favorite("evt-1"));
        assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some(r#"["evt-1"]"#));

        assert!(!favorites.toggle("evt-1"));
        assert!(!favorites.is_favorite("evt-1"));
        assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_persists_across_instances_in_insertion_order() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = Favorites::open(store.clone());
        favorites.toggle("evt-3");
        favorites.toggle("evt-1");
        favorites.toggle("evt-2");
        favorites.toggle("evt-1");

        let reopened = Favorites::open(store);
        assert_eq!(reopened.ids(), ["evt-3".to_string(), "evt-2".to_string()]);
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn test_malformed_storage_is_empty_set() {
        let store = Arc::new(MemoryStore::new());
        store.set(FAVORITES_KEY, "{\"oops\": true}").unwrap();
        let favorites = Favorites::open(store);
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_write_failure_still_toggles() {
        let mut favorites = Favorites::open(Arc::new(ReadOnlyStore));
        assert!(favorites.is_favorite("evt-1"));
        assert!(!favorites.toggle("evt-1"));
        assert!(!favorites.is_favorite("evt-1"));
    }

    #[test]
    fn test_filter_favorites_preserves_event_order() {
        let events = vec![event("evt-1"), event("evt-2"), event("evt-3")];
        let picked = filter_favorites(&events, &["evt-3", "evt-1", "evt-missing"]);
        let ids: Vec<&str> = picked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["evt-1", "evt-3"]);
    }

    #[test]
    fn test_favorite_events() {
        let events = vec![event("evt-1"), event("evt-2")];
        let mut favorites = Favorites::open(Arc::new(MemoryStore::new()));
        favorites.toggle("evt-2");
        assert_eq!(favorites.favorite_events(&events), vec![&events[1]]);
    }
}
