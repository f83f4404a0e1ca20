//! OAuth client credentials for the Google provider, stored at:
//!   ~/.config/confsync/providers/google/app_config.toml

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("confsync")
        .join("providers")
        .join("google"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl AppConfig {
    fn path() -> Result<PathBuf> {
        Ok(base_dir()?.join("app_config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            anyhow::bail!(
                "Google credentials not found.\n\n\
                To connect to Google Calendar, create OAuth credentials:\n\n\
                  1. Go to https://console.cloud.google.com/apis/credentials\n\
                  2. Enable the Google Calendar API for your project\n\
                  3. Click \"Create credentials\" → \"OAuth client ID\" and choose \"Desktop app\"\n\n\
                Then create {} with:\n\n\
                client_id = \"your-client-id.apps.googleusercontent.com\"\n\
                client_secret = \"your-client-secret\"",
                path.display()
            );
        }

        Self::read(&path)
    }

    fn read(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))
    }
}
