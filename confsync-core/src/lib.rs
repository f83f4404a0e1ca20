//! Core of confsync: keeps a remote calendar in step with a CSV of events.
//!
//! - [`event`]: the `Event` value type and remote ids
//! - [`source`]: CSV parsing into a set of events
//! - [`plan`]: diffing remote events against desired events
//! - [`syncer`]: fetch, parse, plan and apply
//! - [`remote`]: the `RemoteCalendar` contract and the provider protocol

pub mod config;
pub mod error;
pub mod event;
pub mod plan;
pub mod remote;
pub mod source;
pub mod syncer;

pub use error::{SyncError, SyncResult};
pub use event::{Event, RemoteEvent, RemoteId};
pub use plan::{Plan, RemoteEventIndex};
pub use remote::RemoteCalendar;
pub use source::{CsvSource, EventSource};
pub use syncer::{ApplyStats, Syncer};
