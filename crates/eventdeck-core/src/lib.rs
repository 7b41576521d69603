//! Core library for eventdeck.
//!
//! Loads a list of local cultural events, keeps an offline copy, and derives
//! filtered views from it:
//!
//! - `pipeline::EventLoader`: cache, then bundled dataset, then live listing
//! - `cache::EventCache`: 30 minute snapshot with stale offline fallback
//! - `sources`: the dataset and listing fetchers
//! - `favorites::Favorites`: persisted favorite ids
//! - `filters::FilterState`: type/date/text filtering
//! - `venues`: venue coordinates for map views
//!
//! Front ends own all state; nothing in this crate is global.

pub mod cache;
pub mod config;
pub mod favorites;
pub mod filters;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod storage;
pub mod utils;
pub mod venues;

pub use cache::EventCache;
pub use config::Config;
pub use favorites::{filter_favorites, Favorites};
pub use filters::{DateFilter, FilterState, TypeFilter};
pub use models::{Event, EventType};
pub use pipeline::{EventLoader, LoadError, Loaded, Origin};
pub use sources::{HttpClient, HttpFetch, ProxyTemplate, RemoteSource, SourceError, StaticSource};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
