//! Data models for event listings.
//!
//! - `Event`: the canonical event every source normalizes into
//! - `EventType`: closed set of categories
//! - `RawEvent`, `RawLocation`: loosely typed records of the static dataset

pub mod event;

pub use event::{
    normalize_url, ordinal_id, Event, EventType, RawEvent, RawLocation, UnknownEventType,
    DEFAULT_LOCATION,
};
