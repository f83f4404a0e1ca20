//! Per-account OAuth session: the access token used for Calendar API calls.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app_config::{AppConfig, base_dir};

/// Refresh a little before Google would reject the token.
const EXPIRY_MARGIN_SECS: i64 = 60;

pub struct Session {
    account_email: String,
    data: SessionData,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<&AccessToken> for SessionData {
    fn from(tokens: &AccessToken) -> Self {
        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        }
    }
}

impl Session {
    fn path_for_account_email(account_email: &str) -> Result<PathBuf> {
        Ok(base_dir()?
            .join("session")
            .join(session_file_name(account_email)))
    }

    fn path(&self) -> Result<PathBuf> {
        Self::path_for_account_email(&self.account_email)
    }

    pub fn new(account_email: &str, data: SessionData) -> Self {
        Session {
            account_email: account_email.to_string(),
            data,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    /// Load a session and refresh it if expired.
    pub async fn load_valid(account_email: &str) -> Result<Self> {
        let mut session = Self::load(account_email)?;

        if session.is_expired() {
            debug!(account = account_email, "Access token expired, refreshing");
            session.refresh().await?;
        }

        Ok(session)
    }

    fn load(account_email: &str) -> Result<Self> {
        let path = Self::path_for_account_email(account_email)?;

        if !path.exists() {
            anyhow::bail!(
                "Google OAuth session for {} not found. Run `confsync auth google` first.",
                account_email
            );
        }

        let contents = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read Google OAuth session from {}",
                path.display()
            )
        })?;

        let data: SessionData = toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse Google OAuth session from {}",
                path.display()
            )
        })?;

        Ok(Session::new(account_email, data))
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        let path = self.path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Owner-only, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.data.expires_at
    }

    async fn refresh(&mut self) -> Result<()> {
        let app_config = AppConfig::load()?;

        let client = Client::new(
            app_config.client_id,
            app_config.client_secret,
            String::new(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        );

        let mut tokens = client
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        // Google usually omits the refresh token on refresh
        if tokens.refresh_token.is_empty() {
            tokens.refresh_token = self.data.refresh_token.clone();
        }

        self.data = (&tokens).into();
        self.save()?;

        Ok(())
    }
}

fn session_file_name(account_email: &str) -> String {
    format!("{}.toml", account_email.replace(['/', '\\', ':'], "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(expires_in: i64) -> SessionData {
        SessionData {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    #[test]
    fn file_name_is_path_safe() {
        assert_eq!(session_file_name("me@example.com"), "me@example.com.toml");
        assert_eq!(session_file_name("a/b:c\\d"), "a_b_c_d.toml");
    }

    #[test]
    fn expiry_has_a_margin() {
        assert!(Session::new("me@example.com", data(10)).is_expired());
        assert!(!Session::new("me@example.com", data(3600)).is_expired());
    }

    #[test]
    fn session_data_survives_toml() {
        let original = data(3600);
        let text = toml::to_string_pretty(&original).unwrap();
        let parsed: SessionData = toml::from_str(&text).unwrap();
        assert_eq!(parsed, original);
    }
}
