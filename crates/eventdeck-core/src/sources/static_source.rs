use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{HttpFetch, SourceError};
use crate::models::{Event, RawEvent};

/// Per-attempt timeout for the bundled dataset.
pub const STATIC_TIMEOUT_SECS: u64 = 10;

/// The bundled dataset: a JSON array of raw event records.
pub struct StaticSource {
    http: Arc<dyn HttpFetch>,
    url: String,
}

impl StaticSource {
    pub fn new(http: Arc<dyn HttpFetch>, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and normalize the dataset. An empty dataset is a success.
    pub async fn fetch(&self) -> Result<Vec<Event>, SourceError> {
        let body = self
            .http
            .fetch(&self.url, Duration::from_secs(STATIC_TIMEOUT_SECS))
            .await?
            .into_success_body()?;

        let events = parse_dataset(&body)?;
        info!(url = %self.url, count = events.len(), "Loaded static dataset");
        Ok(events)
    }
}

/// Normalize a dataset body. Records that are unnamed or fail to decode are
/// dropped; the rest keep their dataset position as ordinal.
pub fn parse_dataset(body: &str) -> Result<Vec<Event>, SourceError> {
    let records: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| SourceError::Parse(format!("static dataset: {}", e)))?;

    let total = records.len();
    let events: Vec<Event> = records
        .into_iter()
        .zip(1u64..)
        .filter_map(|(record, ordinal)| match serde_json::from_value::<RawEvent>(record) {
            Ok(raw) => raw.into_event(ordinal),
            Err(e) => {
                warn!(record = ordinal, error = %e, "Skipping malformed dataset record");
                None
            }
        })
        .collect();

    if events.len() < total {
        debug!(skipped = total - events.len(), "Dropped dataset records");
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::testing::FakeHttp;

    const DATASET: &str = r#"[
        {"name": "Film noir", "eventType": "film", "startDate": "2024-05-01T18:00:00", "location": "Kino Bajka", "url": "https://example.com/1"},
        {"name": "", "eventType": "teatr"},
        {"name": "Wernisaż", "eventType": "wystawa", "location": {"name": "Galeria Labirynt"}}
    ]"#;

    #[tokio::test]
    async fn test_fetch_normalizes_records() {
        let http = Arc::new(FakeHttp::new().respond("file:///events.json", 200, DATASET));
        let source = StaticSource::new(http.clone(), "file:///events.json");

        let events = source.fetch().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "evt-1");
        assert_eq!(events[1].id, "evt-3");
        assert_eq!(events[1].location, "Galeria Labirynt");
        assert_eq!(http.calls(), vec!["file:///events.json".to_string()]);
        assert_eq!(http.timeouts(), vec![Duration::from_secs(STATIC_TIMEOUT_SECS)]);
    }

    #[tokio::test]
    async fn test_empty_dataset_is_success() {
        let http = Arc::new(FakeHttp::new().respond("u", 200, "[]"));
        let events = StaticSource::new(http, "u").fetch().await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let http = Arc::new(FakeHttp::new().respond("u", 404, "missing"));
        let err = StaticSource::new(http, "u").fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_malformed_dataset_fails() {
        let http = Arc::new(FakeHttp::new().respond("u", 200, r#"{"events": []}"#));
        let err = StaticSource::new(http, "u").fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn test_mistyped_record_is_skipped() {
        let events = parse_dataset(
            r#"[{"name": "Good", "eventType": "film"}, {"name": "Bad", "location": 7}, 42, {"name": "Also good"}]"#,
        )
        .unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["evt-1", "evt-4"]);
        assert_eq!(events[1].name, "Also good");
    }

    #[tokio::test]
    async fn test_timeout_fails() {
        let http = Arc::new(FakeHttp::new().timeout("u"));
        let err = StaticSource::new(http, "u").fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Timeout { seconds: STATIC_TIMEOUT_SECS, .. }));
    }

    #[tokio::test]
    async fn test_network_failure_fails() {
        let http = Arc::new(FakeHttp::new());
        let err = StaticSource::new(http, "u").fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Network { .. }));
    }
}
