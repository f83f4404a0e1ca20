//! Desired events, read from a CSV file.
//!
//! The file must start with exactly the header in [`HEADER_NAMES`]. Parsing is
//! fail-fast: the first bad row rejects the whole file.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::debug;

use crate::error::{MalformedInput, SyncError, SyncResult};
use crate::event::Event;

pub const HEADER_NAMES: [&str; 5] = ["start_date", "end_date", "title", "website", "description"];

/// Anything that can produce the desired set of events.
pub trait EventSource {
    fn events(&self) -> SyncResult<HashSet<Event>>;
}

/// A CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for CsvSource {
    fn events(&self) -> SyncResult<HashSet<Event>> {
        let file = File::open(&self.path)?;
        let events = parse_events(file)?;
        debug!(path = %self.path.display(), count = events.len(), "Parsed source file");
        Ok(events)
    }
}

#[derive(Deserialize)]
struct CsvRow {
    #[serde(deserialize_with = "iso_date")]
    start_date: NaiveDate,
    #[serde(deserialize_with = "iso_date")]
    end_date: NaiveDate,
    title: String,
    website: Option<String>,
    description: String,
}

/// Strict `YYYY-MM-DD`: no padding, signs or single-digit fields.
fn iso_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let bytes = raw.as_bytes();

    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !shaped {
        return Err(de::Error::custom(format!(
            "invalid date {raw:?}, expected YYYY-MM-DD"
        )));
    }

    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| de::Error::custom(format!("invalid date {raw:?}: {e}")))
}

/// Parse CSV text into a set of events. Identical rows collapse into one event.
pub fn parse_events<R: Read>(reader: R) -> SyncResult<HashSet<Event>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(csv_error)?.clone();

    if !headers.iter().eq(HEADER_NAMES) {
        return Err(MalformedInput::Header {
            expected: HEADER_NAMES.iter().map(|h| h.to_string()).collect(),
            actual: headers.iter().map(String::from).collect(),
        }
        .into());
    }

    let mut events = HashSet::new();

    for result in csv_reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let row: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|e| MalformedInput::Row {
                line,
                reason: e.to_string(),
            })?;

        let event = Event::new(
            row.title,
            row.start_date,
            row.end_date,
            row.website,
            row.description,
        )
        .map_err(|e| MalformedInput::Row {
            line,
            reason: e.to_string(),
        })?;

        events.insert(event);
    }

    Ok(events)
}

fn csv_error(err: csv::Error) -> SyncError {
    let line = err.position().map(|p| p.line()).unwrap_or_default();
    let reason = err.to_string();

    match err.into_kind() {
        csv::ErrorKind::Io(e) => SyncError::Io(e),
        _ => MalformedInput::Row { line, reason }.into(),
    }
}
