//! Start the OAuth flow: build the consent URL for the caller to open.

use anyhow::Result;
use confsync_core::remote::protocol::{AuthInit, OAuthData};
use google_calendar::Client;
use url::Url;

use crate::app_config::AppConfig;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.calendarlist.readonly",
    "https://www.googleapis.com/auth/calendar.events.owned",
];

pub async fn handle(cmd: AuthInit) -> Result<OAuthData> {
    let app_config = AppConfig::load()?;

    let client = Client::new(
        app_config.client_id,
        app_config.client_secret,
        cmd.redirect_uri,
        String::new(),
        String::new(),
    );

    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();

    // The library picks its own state parameter
    let authorization_url = client.user_consent_url(&scopes);
    let state = state_from_url(&authorization_url)?;

    Ok(OAuthData {
        authorization_url,
        state,
        scopes,
    })
}

fn state_from_url(authorization_url: &str) -> Result<String> {
    Url::parse(authorization_url)?
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| anyhow::anyhow!("No state parameter in authorization URL"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_extracted() {
        let url = "https://accounts.google.com/o/oauth2/v2/auth?client_id=x&state=abc-123&scope=s";
        assert_eq!(state_from_url(url).unwrap(), "abc-123");
    }

    #[test]
    fn missing_state_is_an_error() {
        assert!(state_from_url("https://accounts.google.com/o/oauth2/v2/auth?client_id=x").is_err());
    }
}
