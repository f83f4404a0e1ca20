pub mod auth;
pub mod status;
pub mod sync;

use std::path::Path;

use anyhow::Result;
use confsync_core::config::SyncConfig;
use confsync_core::remote::Remote;
use confsync_core::{CsvSource, Syncer};

/// Build a syncer from the config file, reading `file` instead of the
/// configured source when given.
fn load_syncer(config: Option<&Path>, file: Option<&Path>) -> Result<Syncer<Remote, CsvSource>> {
    let config = SyncConfig::load(config)?;
    let source_path = config.source_path(file)?;

    if !source_path.exists() {
        anyhow::bail!("Source file not found: {}", source_path.display());
    }

    Ok(Syncer::new(config.remote, CsvSource::new(source_path)))
}
