use anyhow::{Context, Result};
use confsync_core::RemoteEvent;
use confsync_core::remote::protocol::ListEvents;
use tracing::{debug, warn};

use super::{check_status, events_url};
use crate::google_event::{EventsPage, FromGoogle, GoogleEvent};
use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

const PAGE_SIZE: &str = "2500";

pub async fn handle(cmd: ListEvents) -> Result<Vec<RemoteEvent>> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let session = Session::load_valid(&config.google_account).await?;

    let http = reqwest::Client::new();
    let url = events_url(&config.google_calendar_id, None)?;

    let mut items: Vec<GoogleEvent> = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let mut query = vec![
            ("timeMin", cmd.from.clone()),
            ("singleEvents", "true".to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token.take() {
            query.push(("pageToken", token));
        }

        let response = http
            .get(url.clone())
            .bearer_auth(session.access_token())
            .query(&query)
            .send()
            .await
            .context("Failed to fetch events")?;

        let page: EventsPage = check_status(response)
            .await?
            .json()
            .await
            .context("Failed to parse events")?;

        debug!(count = page.items.len(), "Fetched page of events");
        items.extend(page.items);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    to_remote_events(items)
}

/// Untitled events cannot come from a CSV source and are left alone.
fn to_remote_events(items: Vec<GoogleEvent>) -> Result<Vec<RemoteEvent>> {
    items
        .into_iter()
        .filter(|item| {
            if item.summary.is_empty() {
                warn!(id = %item.id, "Skipping untitled event");
                false
            } else {
                true
            }
        })
        .map(RemoteEvent::from_google)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn untitled_events_are_skipped() {
        let items: Vec<GoogleEvent> = serde_json::from_value(json!([
            { "id": "a", "summary": "conf", "start": { "date": "2020-03-01" }, "end": { "date": "2020-03-02" } },
            { "id": "b", "start": { "date": "2020-03-01" }, "end": { "date": "2020-03-02" } }
        ]))
        .unwrap();

        let events = to_remote_events(items).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_str(), "a");
    }
}
