//! Calendar API v3 event resource and its mapping to confsync events.
//!
//! All-day events carry an exclusive end date on the wire; confsync events
//! carry an inclusive one. The website lives in the shared extended
//! properties under `website`.

use std::collections::HashMap;

use anyhow::{Result, bail};
use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate};
use confsync_core::{Event, RemoteEvent, RemoteId};
use serde::{Deserialize, Serialize};

pub const WEBSITE_PROPERTY: &str = "website";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start: Option<EventDateTime>,
    #[serde(default)]
    pub end: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendedProperties {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub shared: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub private: HashMap<String, String>,
}

/// One page of `events.list`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    pub next_page_token: Option<String>,
}

impl EventDateTime {
    fn all_day(date: NaiveDate) -> Self {
        EventDateTime {
            date: Some(date),
            date_time: None,
        }
    }
}

pub trait FromGoogle {
    fn from_google(event: GoogleEvent) -> Result<Self>
    where
        Self: Sized;
}

impl FromGoogle for RemoteEvent {
    fn from_google(event: GoogleEvent) -> Result<Self> {
        let Some(start) = event.start.as_ref() else {
            bail!("Event {} has no start time", event.id);
        };
        let Some(end) = event.end.as_ref() else {
            bail!("Event {} has no end time", event.id);
        };

        let start_date = match (start.date, start.date_time) {
            (Some(d), _) => d,
            (None, Some(dt)) => dt.with_timezone(&Local).date_naive(),
            (None, None) => bail!("Event {} has no start time", event.id),
        };

        let end_date = match (end.date, end.date_time) {
            (Some(d), _) => d.checked_sub_days(Days::new(1)).unwrap_or(d),
            (None, Some(dt)) => dt.with_timezone(&Local).date_naive(),
            (None, None) => bail!("Event {} has no end time", event.id),
        };

        let website = event
            .extended_properties
            .as_ref()
            .and_then(|props| props.shared.get(WEBSITE_PROPERTY))
            .filter(|w| !w.is_empty())
            .cloned();

        let converted = Event::new(
            event.summary,
            start_date,
            end_date.max(start_date),
            website,
            event.description,
        )?;

        Ok(RemoteEvent {
            id: RemoteId::new(event.id),
            event: converted,
        })
    }
}

pub trait ToGoogle {
    fn to_google(&self) -> GoogleEvent;
}

impl ToGoogle for Event {
    fn to_google(&self) -> GoogleEvent {
        let end = self
            .end_date()
            .checked_add_days(Days::new(1))
            .unwrap_or(self.end_date());

        let extended_properties = self.website().map(|website| ExtendedProperties {
            shared: HashMap::from([(WEBSITE_PROPERTY.to_string(), website.to_string())]),
            private: HashMap::new(),
        });

        GoogleEvent {
            id: String::new(),
            summary: self.title().to_string(),
            description: self.description().to_string(),
            start: Some(EventDateTime::all_day(self.start_date())),
            end: Some(EventDateTime::all_day(end)),
            extended_properties,
        }
    }
}
