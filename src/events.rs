//! Event-data collaborator interface.
//!
//! Events and their photos come from an external, read-only source
//! (the marketing dataset). The core never mutates photo identity;
//! everything it attaches lives in the metadata stores, keyed by
//! `EventPhoto::id`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A photo inside an event's gallery. Identity (`id`) is the join key
/// across all metadata stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPhoto {
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub order: usize,
}

/// A dated, property-scoped photo set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyEvent {
    pub id: String,
    pub year: i32,
    pub property_id: String,
    pub property_name: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub photos: Vec<EventPhoto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
    pub attendees: u32,
}

/// One calendar year's worth of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventYear {
    pub year: i32,
    pub events: Vec<PropertyEvent>,
}

/// Read-only access to the event dataset
pub trait EventSource {
    fn get_event(&self, event_id: &str) -> Option<&PropertyEvent>;
    fn years(&self) -> Vec<i32>;
    fn events_by_year(&self, year: i32) -> Vec<&PropertyEvent>;
    fn events_by_property(&self, property_id: &str) -> Vec<&PropertyEvent>;
}

/// In-memory event catalog, the plain implementation used for wiring
/// and tests
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    years: Vec<EventYear>,
}

impl EventCatalog {
    pub fn new(years: Vec<EventYear>) -> Self {
        Self { years }
    }

    /// Build a catalog from a flat event list, grouping by year
    pub fn from_events(events: Vec<PropertyEvent>) -> Self {
        let mut years: Vec<EventYear> = Vec::new();
        for event in events {
            match years.iter_mut().find(|y| y.year == event.year) {
                Some(year) => year.events.push(event),
                None => years.push(EventYear {
                    year: event.year,
                    events: vec![event],
                }),
            }
        }
        years.sort_by(|a, b| b.year.cmp(&a.year));
        Self { years }
    }
}

impl EventSource for EventCatalog {
    fn get_event(&self, event_id: &str) -> Option<&PropertyEvent> {
        self.years
            .iter()
            .flat_map(|y| y.events.iter())
            .find(|e| e.id == event_id)
    }

    fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.years.iter().map(|y| y.year).collect();
        years.sort_by(|a, b| b.cmp(a));
        years
    }

    fn events_by_year(&self, year: i32) -> Vec<&PropertyEvent> {
        self.years
            .iter()
            .filter(|y| y.year == year)
            .flat_map(|y| y.events.iter())
            .collect()
    }

    fn events_by_property(&self, property_id: &str) -> Vec<&PropertyEvent> {
        let mut events: Vec<&PropertyEvent> = self
            .years
            .iter()
            .flat_map(|y| y.events.iter())
            .filter(|e| e.property_id == property_id)
            .collect();
        events.sort_by(|a, b| b.date.cmp(&a.date));
        events
    }
}
