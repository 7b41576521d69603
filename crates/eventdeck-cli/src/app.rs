//! Application state for the eventdeck CLI.
//!
//! `App` owns the loader, favorites and filter state for one invocation and
//! renders results to stdout. Diagnostics go through `tracing` to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use eventdeck_core::utils::{pad, truncate_string};
use eventdeck_core::venues::group_by_venue;
use eventdeck_core::{
    Config, DateFilter, Event, EventCache, EventLoader, Favorites, FileStore, FilterState,
    HttpClient, HttpFetch, KeyValueStore, MemoryStore, Origin, RemoteSource, StaticSource,
    TypeFilter,
};

// ============================================================================
// Constants
// ============================================================================

/// Width of the event name column.
const NAME_WIDTH: usize = 40;

/// Width of the date column ("Jan 26 19:00").
const DATE_WIDTH: usize = 12;

/// Width of the type label column.
const TYPE_WIDTH: usize = 9;

pub struct App {
    loader: EventLoader,
    favorites: Favorites,
    filters: FilterState,
    events: Vec<Event>,
    origin: Option<Origin>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        let store = open_store(&config);

        let http: Arc<dyn HttpFetch> = Arc::new(match config.user_agent.as_deref() {
            Some(agent) => HttpClient::with_user_agent(agent),
            None => HttpClient::new(),
        }
        .context("Failed to create HTTP client")?);

        let static_url = config.static_url()?;
        debug!(static_url = %static_url, remote_url = %config.remote_url, "Configured sources");

        let loader = EventLoader::new(
            EventCache::new(store.clone()),
            StaticSource::new(http.clone(), static_url),
            RemoteSource::new(http, config.remote_url.clone(), config.proxy_templates()),
        );

        Ok(Self::from_parts(loader, Favorites::open(store)))
    }

    fn from_parts(loader: EventLoader, favorites: Favorites) -> Self {
        Self {
            loader,
            favorites,
            filters: FilterState::new(),
            events: Vec::new(),
            origin: None,
        }
    }

    pub fn set_filters(&mut self, event_type: Option<&str>, date: Option<&str>, query: Option<&str>) {
        if let Some(t) = event_type {
            let filter = TypeFilter::parse(t);
            if filter == TypeFilter::All && !t.eq_ignore_ascii_case("all") {
                warn!(event_type = t, "Unknown event type, showing all types");
            }
            self.filters.set_type(filter);
        }
        if let Some(d) = date {
            let filter = DateFilter::parse(d);
            if filter == DateFilter::All && !d.eq_ignore_ascii_case("all") {
                warn!(date = d, "Unknown date window, showing all dates");
            }
            self.filters.set_date(filter);
        }
        if let Some(q) = query {
            self.filters.set_query(q);
        }
    }

    /// Load events, falling back to whatever the cache still holds.
    pub async fn load(&mut self, force_refresh: bool) {
        let loaded = self.loader.load_or_offline(force_refresh).await;
        info!(count = loaded.events.len(), origin = ?loaded.origin, "Events loaded");
        self.events = loaded.events;
        self.origin = Some(loaded.origin);
    }

    pub fn print_events(&self) {
        self.print_origin_notice();
        let visible = self.filters.apply(&self.events);
        if visible.is_empty() {
            if self.filters.is_active() {
                println!("No events match the current filters.");
            } else {
                println!("No events.");
            }
            return;
        }
        for event in &visible {
            println!("{}", self.format_row(event));
        }
        if self.filters.is_active() {
            println!("\n{} of {} events", visible.len(), self.events.len());
        }
    }

    pub fn print_favorites(&self) {
        self.print_origin_notice();
        let favorites = self.favorites.favorite_events(&self.events);
        if favorites.is_empty() {
            println!("No favorites yet. Add one with `eventdeck fav <ID>`.");
            return;
        }
        for event in favorites {
            println!("{}", self.format_row(event));
        }
    }

    pub fn toggle_favorite(&mut self, id: &str) {
        if self.favorites.toggle(id) {
            println!("Added {} to favorites", id);
        } else {
            println!("Removed {} from favorites", id);
        }
    }

    pub fn print_venues(&self) {
        self.print_origin_notice();
        let groups = group_by_venue(&self.events);
        if groups.is_empty() {
            println!("No events at known venues.");
            return;
        }
        for group in groups {
            println!(
                "{} ({:.4}, {:.4})",
                group.name, group.coords.lat, group.coords.lon
            );
            for event in group.events {
                println!("  {}  {}", pad(&event.formatted_datetime_short(), DATE_WIDTH), event.name);
            }
        }
    }

    pub fn print_cache_status(&self) {
        let cache = self.loader.cache();
        match cache.age() {
            Some(_) => {
                let state = if cache.is_stale() { "stale" } else { "fresh" };
                println!(
                    "{} events cached, updated {} ({})",
                    cache.get_stale().len(),
                    cache.age_display(),
                    state
                );
            }
            None => println!("Cache is empty"),
        }
    }

    pub fn clear_cache(&self) {
        self.loader.cache().clear();
        println!("Cache cleared");
    }

    fn print_origin_notice(&self) {
        match self.origin {
            Some(Origin::Offline) => eprintln!(
                "Offline: showing cached events from {}",
                self.loader.cache().age_display()
            ),
            Some(Origin::Empty) => eprintln!("Could not load events and no cached copy exists."),
            _ => {}
        }
    }

    fn format_row(&self, event: &Event) -> String {
        let marker = if self.favorites.is_favorite(&event.id) { '*' } else { ' ' };
        format!(
            "{} {}  {}  {}  {}  {}",
            marker,
            pad(&event.id, 8),
            pad(&event.formatted_datetime_short(), DATE_WIDTH),
            pad(event.event_type.label(), TYPE_WIDTH),
            pad(&truncate_string(&event.name, NAME_WIDTH), NAME_WIDTH),
            event.location
        )
    }
}

/// File-backed store in the data directory, or an in-memory one when the
/// directory can't be used (nothing persists between runs then).
fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    let dir = match config.data_dir() {
        Ok(dir) => dir,
        Err(e) => {
            warn!(error = %e, "No data directory, using in-memory storage");
            return Arc::new(MemoryStore::new());
        }
    };
    match FileStore::new(dir.clone()) {
        Ok(store) => {
            debug!(dir = %store.dir().display(), "Using file storage");
            Arc::new(store)
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to open storage, using in-memory storage");
            Arc::new(MemoryStore::new())
        }
    }
}
