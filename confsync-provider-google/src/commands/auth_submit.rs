//! Finish the OAuth flow: exchange the code, store the session, return the account email.

use anyhow::{Context, Result};
use confsync_core::remote::protocol::AuthSubmit;
use google_calendar::Client;
use google_calendar::types::MinAccessRole;
use tracing::info;

use crate::app_config::AppConfig;
use crate::session::{Session, SessionData};

pub async fn handle(cmd: AuthSubmit) -> Result<String> {
    let app_config = AppConfig::load()?;

    let mut client = Client::new(
        app_config.client_id.clone(),
        app_config.client_secret.clone(),
        cmd.redirect_uri.clone(),
        String::new(),
        String::new(),
    );

    let tokens = client
        .get_access_token(&cmd.code, &cmd.state)
        .await
        .context("Failed to exchange authorization code for tokens")?;

    let session_data: SessionData = (&tokens).into();

    let client = Client::new(
        app_config.client_id,
        app_config.client_secret,
        cmd.redirect_uri,
        tokens.access_token.clone(),
        tokens.refresh_token.clone(),
    );

    // The primary calendar is named after the account email
    let calendars = client
        .calendar_list()
        .list_all(MinAccessRole::default(), false, false)
        .await
        .context("Failed to fetch calendars")?
        .body;

    let account_email = calendars
        .iter()
        .find(|cal| cal.primary)
        .map(|cal| cal.summary.clone())
        .ok_or_else(|| anyhow::anyhow!("No primary calendar found"))?;

    Session::new(&account_email, session_data).save()?;
    info!(account = %account_email, "Stored Google session");

    Ok(account_email)
}
