use anyhow::{Context, Result};
use confsync_core::remote::protocol::CreateEvent;
use confsync_core::{RemoteEvent, RemoteId};
use tracing::debug;

use super::{check_status, events_url};
use crate::google_event::{GoogleEvent, ToGoogle};
use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

pub async fn handle(cmd: CreateEvent) -> Result<RemoteEvent> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let session = Session::load_valid(&config.google_account).await?;

    // Google assigns the id
    let google_event = cmd.event.to_google();

    let response = reqwest::Client::new()
        .post(events_url(&config.google_calendar_id, None)?)
        .bearer_auth(session.access_token())
        .query(&[("sendUpdates", "none")])
        .json(&google_event)
        .send()
        .await
        .with_context(|| format!("Failed to create event: {}", google_event.summary))?;

    let created: GoogleEvent = check_status(response)
        .await
        .with_context(|| format!("Failed to create event: {}", google_event.summary))?
        .json()
        .await
        .context("Failed to parse created event")?;

    debug!(id = %created.id, "Created event");

    Ok(RemoteEvent {
        id: RemoteId::new(created.id),
        event: cmd.event,
    })
}
