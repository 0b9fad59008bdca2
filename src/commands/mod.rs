pub mod attendance;
pub mod delete;
pub mod list;
pub mod save;

use anyhow::{Context, Result};
use deptcal_core::EventEngine;
use deptcal_core::config::DeptCalConfig;
use deptcal_core::store::JsonFileStore;

/// Engine over the JSON store in the configured data directory.
pub fn open_engine() -> Result<(DeptCalConfig, EventEngine<JsonFileStore>)> {
    let config = DeptCalConfig::load().context("Failed to load config")?;
    let store = JsonFileStore::new(config.data_path());
    tracing::debug!(data_dir = %store.dir().display(), "Opened store");

    let engine = EventEngine::new(store, config.engine_config());
    Ok((config, engine))
}
