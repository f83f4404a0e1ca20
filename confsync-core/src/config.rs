//! Configuration at ~/.config/confsync/config.toml
//!
//! ```toml
//! source = "~/conferences.csv"
//!
//! [remote]
//! provider = "google"
//! google_account = "me@example.com"
//! google_calendar_id = "conferences@group.calendar.google.com"
//! ```
//!
//! Any key can be overridden from the environment, e.g.
//! `CONFSYNC_SOURCE` or `CONFSYNC_REMOTE__GOOGLE_ACCOUNT`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{SyncError, SyncResult};
use crate::remote::Remote;

const ENV_PREFIX: &str = "CONFSYNC";

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// CSV file with the desired events.
    #[serde(default)]
    pub source: Option<PathBuf>,

    pub remote: Remote,
}

impl SyncConfig {
    pub fn default_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("confsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> SyncResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            return Err(SyncError::Config(format!(
                "Config file not found at {}\n\n\
                 Create it with:\n\n\
                 source = \"~/conferences.csv\"\n\n\
                 [remote]\n\
                 provider = \"google\"\n\
                 google_account = \"you@gmail.com\"\n\
                 google_calendar_id = \"<calendar id>\"\n\n\
                 Run `confsync auth google` to find your account name.",
                config_path.display()
            )));
        }

        Config::builder()
            .add_source(File::from(config_path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Resolve the CSV path, preferring `override_path`. Expands `~`.
    pub fn source_path(&self, override_path: Option<&Path>) -> SyncResult<PathBuf> {
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(|| self.source.clone())
            .ok_or_else(|| {
                SyncError::Config(
                    "No source file. Set `source` in the config or pass --file.".into(),
                )
            })?;

        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        Ok(PathBuf::from(expanded))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_source_and_remote() {
        let file = write_config(
            r#"
source = "/tmp/conferences.csv"

[remote]
provider = "google"
google_account = "me@example.com"
"#,
        );

        let config = SyncConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.source, Some(PathBuf::from("/tmp/conferences.csv")));
        assert_eq!(config.remote.provider.name(), "google");
        assert_eq!(config.remote.account_identifier(), Some("me@example.com"));
    }

    #[test]
    fn source_is_optional() {
        let file = write_config("[remote]\nprovider = \"google\"\n");
        let config = SyncConfig::load(Some(file.path())).unwrap();
        assert!(config.source.is_none());
        assert!(matches!(
            config.source_path(None),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SyncConfig::load(Some(&dir.path().join("nope.toml")));

        match result {
            Err(SyncError::Config(msg)) => assert!(msg.contains("[remote]")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_remote_is_config_error() {
        let file = write_config("source = \"a.csv\"\n");
        assert!(matches!(
            SyncConfig::load(Some(file.path())),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn override_path_wins() {
        let file = write_config("source = \"/tmp/a.csv\"\n[remote]\nprovider = \"google\"\n");
        let config = SyncConfig::load(Some(file.path())).unwrap();

        assert_eq!(
            config.source_path(Some(Path::new("/tmp/b.csv"))).unwrap(),
            PathBuf::from("/tmp/b.csv")
        );
        assert_eq!(config.source_path(None).unwrap(), PathBuf::from("/tmp/a.csv"));
    }

    #[test]
    fn tilde_is_expanded() {
        let file = write_config("source = \"~/a.csv\"\n[remote]\nprovider = \"google\"\n");
        let config = SyncConfig::load(Some(file.path())).unwrap();

        let path = config.source_path(None).unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("a.csv"));
    }
}
