//! Event acquisition: cache first, then the static dataset, then the live
//! listing, with the stale cache as the offline fallback.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::EventCache;
use crate::models::Event;
use crate::sources::{RemoteSource, SourceError, StaticSource};

/// Every source failed. Distinct from a successful load of zero events.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("All event sources failed (static: {static_error}; remote: {remote_error})")]
    AllSourcesFailed {
        static_error: SourceError,
        remote_error: SourceError,
    },
}

/// Where a list of events came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Fresh cache snapshot, no network used.
    Cache,
    Static,
    Remote,
    /// Live sources failed; stale cache snapshot.
    Offline,
    /// Nothing available at all.
    Empty,
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub events: Vec<Event>,
    pub origin: Origin,
}

pub struct EventLoader {
    cache: EventCache,
    static_source: StaticSource,
    remote_source: RemoteSource,
}

impl EventLoader {
    pub fn new(cache: EventCache, static_source: StaticSource, remote_source: RemoteSource) -> Self {
        Self {
            cache,
            static_source,
            remote_source,
        }
    }

    pub fn cache(&self) -> &EventCache {
        &self.cache
    }

    /// Load the event list.
    ///
    /// Without `force_refresh` a fresh cache snapshot is returned as-is.
    /// Otherwise the static dataset is tried, then the remote listing when the
    /// dataset yields nothing. Non-empty results are written back to the cache.
    pub async fn load(&self, force_refresh: bool) -> Result<Vec<Event>, LoadError> {
        self.load_with_origin(force_refresh)
            .await
            .map(|loaded| loaded.events)
    }

    async fn load_with_origin(&self, force_refresh: bool) -> Result<Loaded, LoadError> {
        if !force_refresh {
            if let Some(events) = self.cache.get() {
                debug!(count = events.len(), "Serving events from cache");
                return Ok(Loaded {
                    events,
                    origin: Origin::Cache,
                });
            }
        }

        let static_error = match self.static_source.fetch().await {
            Ok(events) if !events.is_empty() => {
                self.cache.set(&events);
                return Ok(Loaded {
                    events,
                    origin: Origin::Static,
                });
            }
            Ok(_) => {
                info!(url = self.static_source.url(), "Static dataset is empty, trying remote");
                None
            }
            Err(e) => {
                warn!(url = self.static_source.url(), error = %e, "Static dataset failed, trying remote");
                Some(e)
            }
        };

        match self.remote_source.fetch().await {
            Ok(events) => {
                if !events.is_empty() {
                    self.cache.set(&events);
                }
                Ok(Loaded {
                    events,
                    origin: Origin::Remote,
                })
            }
            Err(remote_error) => match static_error {
                Some(static_error) => Err(LoadError::AllSourcesFailed {
                    static_error,
                    remote_error,
                }),
                None => {
                    // The dataset answered with zero events; that is the result.
                    warn!(error = %remote_error, "Remote listing failed after empty dataset");
                    Ok(Loaded {
                        events: Vec::new(),
                        origin: Origin::Static,
                    })
                }
            },
        }
    }

    /// Last cached events regardless of age, for offline use.
    pub fn offline_events(&self) -> Vec<Event> {
        self.cache.get_stale()
    }

    /// Load, falling back to the stale cache when every source fails.
    ///
    /// Never fails: a terminal load error with no cached data yields an empty
    /// list with `Origin::Empty`.
    pub async fn load_or_offline(&self, force_refresh: bool) -> Loaded {
        match self.load_with_origin(force_refresh).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "Failed to load events, falling back to offline cache");
                let events = self.offline_events();
                let origin = if events.is_empty() {
                    Origin::Empty
                } else {
                    Origin::Offline
                };
                Loaded { events, origin }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
