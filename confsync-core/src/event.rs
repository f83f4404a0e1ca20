//! The event value type.
//!
//! An `Event` is identified by its full value: two events with the same five
//! fields are the same event, and an event whose description changes is a
//! different event. There is no id on the desired side; remote ids live in
//! [`RemoteEvent`] and the index built from it.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::InvalidEvent;

/// A calendar entry for a conference, spanning whole days.
///
/// Field order matters: the derived ordering sorts by dates first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "EventRecord")]
pub struct Event {
    start_date: NaiveDate,
    /// Inclusive.
    end_date: NaiveDate,
    title: String,
    website: Option<String>,
    description: String,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        website: Option<String>,
        description: impl Into<String>,
    ) -> Result<Self, InvalidEvent> {
        let title = title.into();

        if title.is_empty() {
            return Err(InvalidEvent::EmptyTitle);
        }

        if end_date < start_date {
            return Err(InvalidEvent::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Event {
            start_date,
            end_date,
            title,
            website,
            description: description.into(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Date span for display, e.g. "2020-03-01" or "2020-03-01 → 2020-03-02".
    pub fn render_dates(&self) -> String {
        if self.start_date == self.end_date {
            self.start_date.format("%Y-%m-%d").to_string()
        } else {
            format!(
                "{} → {}",
                self.start_date.format("%Y-%m-%d"),
                self.end_date.format("%Y-%m-%d")
            )
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Unvalidated wire form of an [`Event`].
#[derive(Deserialize)]
struct EventRecord {
    start_date: NaiveDate,
    end_date: NaiveDate,
    title: String,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    description: String,
}

impl TryFrom<EventRecord> for Event {
    type Error = InvalidEvent;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        Event::new(
            record.title,
            record.start_date,
            record.end_date,
            record.website,
            record.description,
        )
    }
}

/// Identifier assigned by the remote calendar service. Only used for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        RemoteId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RemoteId {
    fn from(id: &str) -> Self {
        RemoteId::new(id)
    }
}

/// An event as it exists on the remote, tagged with its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub id: RemoteId,
    pub event: Event,
}
