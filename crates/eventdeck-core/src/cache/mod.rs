//! Offline cache of the last successfully loaded event list.
//!
//! `EventCache` keeps one snapshot in a `KeyValueStore` slot. A snapshot is
//! fresh for 30 minutes; stale snapshots remain available as an offline
//! fallback through `get_stale`.

pub mod manager;

pub use manager::{age_display, CacheRecord, EventCache, CACHE_KEY, CACHE_TTL_MINUTES};
