pub mod auth_init;
pub mod auth_submit;
pub mod create_event;
pub mod delete_event;
pub mod list_events;

use anyhow::{Result, bail};
use url::Url;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// `{API_BASE}/calendars/{calendar_id}/events[/{event_id}]`, with ids percent-encoded.
fn events_url(calendar_id: &str, event_id: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(API_BASE)?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Invalid API base URL"))?;
        segments.extend(["calendars", calendar_id, "events"]);
        if let Some(id) = event_id {
            segments.push(id);
        }
    }
    Ok(url)
}

/// Turn a non-2xx answer into an error carrying Google's message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    bail!("Google Calendar API returned {}: {}", status, body.trim());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_id_is_encoded() {
        let url = events_url("team#conf@group.calendar.google.com", None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team%23conf@group.calendar.google.com/events"
        );
    }

    #[test]
    fn event_id_is_appended() {
        let url = events_url("primary", Some("abc123")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events/abc123"
        );
    }
}
