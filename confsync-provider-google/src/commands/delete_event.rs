use std::fmt;

use anyhow::{Context, Result};
use confsync_core::remote::protocol::DeleteEvent;
use reqwest::StatusCode;

use super::{check_status, events_url};
use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

/// The event id is unknown to Google, or the event was already deleted.
#[derive(Debug)]
pub struct EventNotFound(pub String);

impl fmt::Display for EventNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event not found: {}", self.0)
    }
}

impl std::error::Error for EventNotFound {}

pub async fn handle(cmd: DeleteEvent) -> Result<()> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let session = Session::load_valid(&config.google_account).await?;
    let event_id = cmd.event_id.as_str();

    let response = reqwest::Client::new()
        .delete(events_url(&config.google_calendar_id, Some(event_id))?)
        .bearer_auth(session.access_token())
        .query(&[("sendUpdates", "none")])
        .send()
        .await
        .with_context(|| format!("Failed to delete event: {}", event_id))?;

    if is_gone(response.status()) {
        return Err(EventNotFound(event_id.to_string()).into());
    }

    check_status(response)
        .await
        .with_context(|| format!("Failed to delete event: {}", event_id))?;

    Ok(())
}

fn is_gone(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status == StatusCode::GONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_gone_mean_missing() {
        assert!(is_gone(StatusCode::NOT_FOUND));
        assert!(is_gone(StatusCode::GONE));
        assert!(!is_gone(StatusCode::NO_CONTENT));
        assert!(!is_gone(StatusCode::UNAUTHORIZED));
    }
}
