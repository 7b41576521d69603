//! Extraction of events from embedded structured-data blocks.
//!
//! The listing page carries its events in `<script type="application/ld+json">`
//! blocks. This is a narrow text scanner, not an HTML parser: blocks are
//! located with a pattern over the raw HTML and each payload is decoded on
//! its own.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::models::{ordinal_id, Event};

static LD_JSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script[^>]+type=["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid ld+json regex")
});

/// Raw payloads of every structured-data block, in document order.
pub fn extract_blocks(html: &str) -> Vec<&str> {
    LD_JSON_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Parse every `ItemList` block in the document into events.
///
/// A block that fails to decode is skipped without affecting the others.
/// List items without an `item.name` are ignored.
pub fn parse_events(html: &str) -> Vec<Event> {
    let mut events = Vec::new();

    for (index, block) in extract_blocks(html).into_iter().enumerate() {
        let data: Value = match serde_json::from_str(block.trim()) {
            Ok(data) => data,
            Err(e) => {
                warn!(block = index, error = %e, "Failed to parse structured-data block");
                continue;
            }
        };
        collect_item_list(&data, &mut events);
    }

    events
}

fn collect_item_list(data: &Value, events: &mut Vec<Event>) {
    if data.get("@type").and_then(Value::as_str) != Some("ItemList") {
        return;
    }
    let Some(elements) = data.get("itemListElement").and_then(Value::as_array) else {
        return;
    };

    for list_item in elements {
        let Some(item) = list_item.get("item") else {
            continue;
        };
        let Some(name) = item.get("name").and_then(Value::as_str) else {
            continue;
        };

        let id = match position(list_item) {
            Some(pos) => ordinal_id(pos),
            None => ordinal_id(events.len() as u64),
        };

        let location = item
            .get("location")
            .and_then(|loc| loc.get("name"))
            .and_then(Value::as_str);

        if let Some(event) = Event::from_raw(
            id,
            name,
            item.get("eventType").and_then(Value::as_str),
            item.get("startDate").and_then(Value::as_str),
            location,
            item.get("url").and_then(Value::as_str),
        ) {
            events.push(event);
        }
    }
}

/// List position, when present and non-zero. Numeric strings are accepted.
fn position(list_item: &Value) -> Option<u64> {
    let pos = match list_item.get("position")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (pos > 0).then_some(pos)
}
