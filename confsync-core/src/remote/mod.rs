//! Remote calendar access.
//!
//! [`RemoteCalendar`] is the narrow contract the syncer depends on. [`Remote`]
//! implements it on top of a provider binary.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};
use crate::event::{Event, RemoteEvent, RemoteId};
use crate::plan::RemoteEventIndex;
use crate::remote::protocol::{CreateEvent, DeleteEvent, ErrorCode, ListEvents};
use crate::remote::provider::Provider;

/// The three operations reconciliation needs from a calendar service.
///
/// Calls are issued one at a time; each completes before the next starts.
#[allow(async_fn_in_trait)]
pub trait RemoteCalendar {
    /// Events that have not concluded yet, keyed by value.
    async fn fetch_events(&self) -> SyncResult<RemoteEventIndex>;

    /// Create an event. Not idempotent.
    async fn add(&self, event: &Event) -> SyncResult<()>;

    /// Delete an event. Fails with `StaleIdentifier` if it is already gone.
    async fn remove(&self, id: &RemoteId) -> SyncResult<()>;
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// Remote provider configuration (e.g., Google Calendar settings)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }

    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote { provider, config }
    }

    /// Returns the account identifier for this remote, if present.
    ///
    /// Looks for a `{provider}_account` field in the config (e.g. `google_account`).
    pub fn account_identifier(&self) -> Option<&str> {
        let key = format!("{}_account", self.provider.name());
        self.config.0.get(&key).and_then(|v| v.as_str())
    }

    pub async fn events(&self) -> SyncResult<Vec<RemoteEvent>> {
        self.provider
            .call(ListEvents {
                remote_config: self.remote_config(),
                from: Utc::now().to_rfc3339(),
            })
            .await
    }

    pub async fn create_event(&self, event: &Event) -> SyncResult<RemoteEvent> {
        self.provider
            .call(CreateEvent {
                remote_config: self.remote_config(),
                event: event.clone(),
            })
            .await
    }

    /// Delete an event. A provider `not_found` becomes `StaleIdentifier`.
    pub async fn delete_event(&self, event_id: &RemoteId) -> SyncResult<()> {
        let response = self
            .provider
            .call_coded(DeleteEvent {
                remote_config: self.remote_config(),
                event_id: event_id.clone(),
            })
            .await?;

        stale_if_not_found(response, event_id)
    }
}

impl RemoteCalendar for Remote {
    async fn fetch_events(&self) -> SyncResult<RemoteEventIndex> {
        Ok(index_remote_events(self.events().await?))
    }

    async fn add(&self, event: &Event) -> SyncResult<()> {
        let created = self.create_event(event).await?;
        debug!(id = %created.id, title = event.title(), "Created remote event");
        Ok(())
    }

    async fn remove(&self, id: &RemoteId) -> SyncResult<()> {
        self.delete_event(id).await
    }
}

fn stale_if_not_found(response: Result<(), ErrorCode>, id: &RemoteId) -> SyncResult<()> {
    match response {
        Ok(()) => Ok(()),
        Err(ErrorCode::NotFound) => Err(SyncError::StaleIdentifier(id.clone())),
    }
}

/// Key remote events by value.
///
/// Field-identical remote events collapse to a single entry (the last one
/// listed wins). The dropped id is logged and never reaches a plan.
pub fn index_remote_events(events: Vec<RemoteEvent>) -> RemoteEventIndex {
    let mut index = RemoteEventIndex::with_capacity(events.len());

    for RemoteEvent { id, event } in events {
        if let Some(previous) = index.insert(event, id.clone()) {
            warn!(
                kept = %id,
                dropped = %previous,
                "Remote calendar has duplicate events; one id is unreachable"
            );
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn remote_event(id: &str, title: &str) -> RemoteEvent {
        RemoteEvent {
            id: RemoteId::new(id),
            event: Event::new(
                title,
                NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
                None,
                "",
            )
            .unwrap(),
        }
    }

    #[test]
    fn index_keys_by_value() {
        let index = index_remote_events(vec![remote_event("1", "a"), remote_event("2", "b")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index[&remote_event("1", "a").event], RemoteId::new("1"));
    }

    #[test]
    fn identical_remote_events_collapse() {
        let index = index_remote_events(vec![remote_event("1", "same"), remote_event("2", "same")]);
        assert_eq!(index.len(), 1);
        assert_eq!(index[&remote_event("x", "same").event], RemoteId::new("2"));
    }

    #[test]
    fn not_found_on_delete_is_a_stale_identifier() {
        let id = RemoteId::new("deleted-elsewhere");

        match stale_if_not_found(Err(ErrorCode::NotFound), &id) {
            Err(SyncError::StaleIdentifier(stale)) => assert_eq!(stale, id),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(stale_if_not_found(Ok(()), &id).is_ok());
    }

    #[test]
    fn account_identifier_uses_provider_prefix() {
        let mut map = HashMap::new();
        map.insert(
            "google_account".to_string(),
            toml::Value::String("me@example.com".into()),
        );
        let remote = Remote::new(Provider::from_name("google"), RemoteConfig(map));
        assert_eq!(remote.account_identifier(), Some("me@example.com"));
    }

    #[test]
    fn remote_config_converts_to_json_map() {
        let mut map = HashMap::new();
        map.insert(
            "google_calendar_id".to_string(),
            toml::Value::String("primary".into()),
        );
        let json = serde_json::Map::from(&RemoteConfig(map));
        assert_eq!(json["google_calendar_id"], "primary");
    }
}
