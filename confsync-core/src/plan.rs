//! Edit plan computation.
//!
//! Events are compared by full value, so a changed field never produces an
//! update: the old value's id is removed and the new value is added.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::event::{Event, RemoteId};

/// Remote events keyed by value. Built fresh from each fetch.
///
/// Two remote events with identical values collapse into one entry; the other
/// id never appears in a plan.
pub type RemoteEventIndex = HashMap<Event, RemoteId>;

/// The changes needed to make the remote calendar match the desired events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub to_remove: BTreeSet<RemoteId>,
    pub to_add: BTreeSet<Event>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// (added, removed)
    pub fn counts(&self) -> (usize, usize) {
        (self.to_add.len(), self.to_remove.len())
    }
}

/// Compute the plan that turns `existing` into `desired`.
pub fn plan(existing: &RemoteEventIndex, desired: &HashSet<Event>) -> Plan {
    let to_add = desired
        .iter()
        .filter(|event| !existing.contains_key(*event))
        .cloned()
        .collect();

    let to_remove = existing
        .iter()
        .filter(|(event, _)| !desired.contains(*event))
        .map(|(_, id)| id.clone())
        .collect();

    Plan { to_remove, to_add }
}
