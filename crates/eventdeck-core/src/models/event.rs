use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Venue used when a source does not say where an event takes place.
pub const DEFAULT_LOCATION: &str = "Lublin";

/// Prefix for ordinal-derived event ids.
const ID_PREFIX: &str = "evt-";

// ============================================================================
// Event Type
// ============================================================================

/// Closed set of event categories.
///
/// The serialized form is the lowercase Polish category name used by the
/// upstream listing, so cached records stay readable by older builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "film")]
    Film,
    #[serde(rename = "wystawa")]
    Exhibition,
    #[serde(rename = "spektakl")]
    Performance,
    #[serde(rename = "teatr")]
    Theater,
    #[serde(rename = "koncert")]
    Concert,
    #[serde(rename = "inne", alias = "other")]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Film,
        EventType::Exhibition,
        EventType::Performance,
        EventType::Theater,
        EventType::Concert,
        EventType::Other,
    ];

    /// Normalize a raw category string from a source.
    ///
    /// Only the upstream category names are recognised; `dzieci` (children's
    /// events), blanks and anything unknown collapse into `Other`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "film" => EventType::Film,
            "wystawa" => EventType::Exhibition,
            "spektakl" => EventType::Performance,
            "teatr" => EventType::Theater,
            "koncert" => EventType::Concert,
            _ => EventType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Film => "film",
            EventType::Exhibition => "wystawa",
            EventType::Performance => "spektakl",
            EventType::Theater => "teatr",
            EventType::Concert => "koncert",
            EventType::Other => "inne",
        }
    }

    /// Human readable label for list views.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Film => "Film",
            EventType::Exhibition => "Wystawa",
            EventType::Performance => "Spektakl",
            EventType::Theater => "Teatr",
            EventType::Concert => "Koncert",
            EventType::Other => "Inne",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventType(pub String);

impl fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event type: {}", self.0)
    }
}

impl std::error::Error for UnknownEventType {}

impl FromStr for EventType {
    type Err = UnknownEventType;

    /// Strict parse used for user input: accepts the Polish names and their
    /// English equivalents, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "film" | "movie" => Ok(EventType::Film),
            "wystawa" | "exhibition" => Ok(EventType::Exhibition),
            "spektakl" | "performance" => Ok(EventType::Performance),
            "teatr" | "theater" | "theatre" => Ok(EventType::Theater),
            "koncert" | "concert" => Ok(EventType::Concert),
            "inne" | "other" => Ok(EventType::Other),
            _ => Err(UnknownEventType(s.to_string())),
        }
    }
}

// ============================================================================
// Event
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub date: Option<String>,
    pub location: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Event {
    /// Build an event from raw source fields, applying every normalization
    /// rule. Returns `None` when the record has no usable name.
    pub fn from_raw(
        id: String,
        name: &str,
        raw_type: Option<&str>,
        date: Option<&str>,
        location: Option<&str>,
        url: Option<&str>,
    ) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            id,
            name: name.to_string(),
            event_type: EventType::normalize(raw_type.unwrap_or_default()),
            date: date
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            location: normalize_location(location),
            url: url.and_then(normalize_url),
        })
    }

    /// Calendar day of the event in the local timezone.
    ///
    /// Date-only values name the day directly, naive date-times are read as
    /// local time and offset date-times are converted to local time. Returns
    /// `None` for absent or unparseable dates.
    pub fn local_day(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local).date_naive());
        }
        if let Ok(naive) = parse_naive_datetime(raw) {
            return Some(naive.date());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    /// Start time in the local timezone, when the date carries a time.
    pub fn local_start(&self) -> Option<DateTime<Local>> {
        let raw = self.date.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local));
        }
        let naive = parse_naive_datetime(raw).ok()?;
        Local.from_local_datetime(&naive).earliest()
    }

    pub fn formatted_date(&self) -> String {
        match (self.local_start(), self.local_day()) {
            (Some(dt), _) => dt.format("%b %d, %Y").to_string(),
            (None, Some(day)) => day.format("%b %d, %Y").to_string(),
            (None, None) => match &self.date {
                // Fall back to raw date string, truncate if too long
                Some(raw) => raw.chars().take(10).collect(),
                None => "TBD".to_string(),
            },
        }
    }

    pub fn formatted_time(&self) -> Option<String> {
        self.local_start().map(|dt| dt.format("%H:%M").to_string())
    }

    /// Compact date/time for list view: "Jan 26 19:00"
    pub fn formatted_datetime_short(&self) -> String {
        match (self.local_start(), self.local_day()) {
            (Some(dt), _) => dt.format("%b %d %H:%M").to_string(),
            (None, Some(day)) => day.format("%b %d").to_string(),
            (None, None) => "TBD".to_string(),
        }
    }

    /// Text the search filter matches against.
    pub fn searchable_text(&self) -> String {
        format!("{} {} {}", self.name, self.location, self.event_type).to_lowercase()
    }
}

/// Id for the n-th event produced by a source.
pub fn ordinal_id(ordinal: u64) -> String {
    format!("{}{}", ID_PREFIX, ordinal)
}

/// Keep only absolute http(s) URLs.
pub fn normalize_url(candidate: &str) -> Option<String> {
    match url::Url::parse(candidate) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(candidate.to_string()),
        _ => None,
    }
}

fn normalize_location(location: Option<&str>) -> String {
    location
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LOCATION)
        .to_string()
}

fn parse_naive_datetime(raw: &str) -> chrono::ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
}

// ============================================================================
// Raw Records
// ============================================================================

/// Location as it appears in source payloads: either a bare venue name or a
/// `Place`-style object with a `name`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    Name(String),
    Place {
        #[serde(default)]
        name: Option<String>,
    },
}

impl RawLocation {
    pub fn name(&self) -> Option<&str> {
        match self {
            RawLocation::Name(name) => Some(name),
            RawLocation::Place { name } => name.as_deref(),
        }
    }
}

/// One record of the bundled static dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "eventType", alias = "type", default)]
    pub event_type: Option<String>,
    #[serde(rename = "startDate", alias = "date", default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawEvent {
    /// Normalize into a canonical event; `ordinal` is the 1-based position in
    /// the dataset and only used when the record carries no id.
    pub fn into_event(self, ordinal: u64) -> Option<Event> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| ordinal_id(ordinal));
        Event::from_raw(
            id,
            self.name.as_deref().unwrap_or_default(),
            self.event_type.as_deref(),
            self.start_date.as_deref(),
            self.location.as_ref().and_then(RawLocation::name),
            self.url.as_deref(),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
