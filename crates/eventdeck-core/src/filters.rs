//! Filter state and predicate composition for event lists.

use chrono::{Duration, Local, NaiveDate};

use crate::models::{Event, EventType};

/// Category filter. Parsing is permissive: anything unrecognised is `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(EventType),
}

impl TypeFilter {
    pub fn parse(s: &str) -> Self {
        s.parse::<EventType>()
            .map(TypeFilter::Only)
            .unwrap_or(TypeFilter::All)
    }

    fn matches(&self, event: &Event) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => event.event_type == *t,
        }
    }
}

/// Date window filter. Parsing is permissive: anything unrecognised is `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Tomorrow,
    /// Today and the six following days.
    Week,
}

impl DateFilter {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "today" => DateFilter::Today,
            "tomorrow" => DateFilter::Tomorrow,
            "week" => DateFilter::Week,
            _ => DateFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateFilter::All => "all",
            DateFilter::Today => "today",
            DateFilter::Tomorrow => "tomorrow",
            DateFilter::Week => "week",
        }
    }

    /// Events with an unknown or unreadable date only pass `All`.
    fn matches(&self, event: &Event, today: NaiveDate) -> bool {
        if *self == DateFilter::All {
            return true;
        }
        let Some(day) = event.local_day() else {
            return false;
        };
        match self {
            DateFilter::All => true,
            DateFilter::Today => day == today,
            DateFilter::Tomorrow => day == today + Duration::days(1),
            DateFilter::Week => day >= today && day < today + Duration::days(7),
        }
    }
}

/// Current type/date/query selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    event_type: TypeFilter,
    date: DateFilter,
    query: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_type(&mut self, event_type: TypeFilter) {
        self.event_type = event_type;
    }

    pub fn set_date(&mut self, date: DateFilter) {
        self.date = date;
    }

    /// Stored lowercased and trimmed.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
    }

    pub fn event_type(&self) -> TypeFilter {
        self.event_type
    }

    pub fn date(&self) -> DateFilter {
        self.date
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    fn matches_query(&self, event: &Event) -> bool {
        self.query.is_empty() || event.searchable_text().contains(&self.query)
    }

    /// Events passing every filter, in input order, relative to the local
    /// calendar day.
    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        self.apply_on(events, Local::now().date_naive())
    }

    /// `apply` with an explicit reference day.
    pub fn apply_on<'a>(&self, events: &'a [Event], today: NaiveDate) -> Vec<&'a Event> {
        events
            .iter()
            .filter(|e| {
                self.event_type.matches(e) && self.date.matches(e, today) && self.matches_query(e)
            })
            .collect()
    }
}
