//! Global deptcal configuration.

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::constants::{
    DEFAULT_ARCHIVE_COLLECTION, DEFAULT_BUCKET_COLLECTION, DEFAULT_EVENTS_COLLECTION, MAX_CHUNK,
};
use crate::error::{DeptCalError, DeptCalResult};

static DEFAULT_DATA_DIR: &str = "~/.local/share/deptcal";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_max_chunk() -> usize {
    MAX_CHUNK
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Collections {
    pub events: String,
    pub archive: String,
    pub bucket: String,
}

impl Default for Collections {
    fn default() -> Self {
        Collections {
            events: DEFAULT_EVENTS_COLLECTION.to_string(),
            archive: DEFAULT_ARCHIVE_COLLECTION.to_string(),
            bucket: DEFAULT_BUCKET_COLLECTION.to_string(),
        }
    }
}

/// Configuration at ~/.config/deptcal/config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DeptCalConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_max_chunk")]
    pub max_chunk: usize,

    /// Department used when a draft names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_department: Option<String>,

    #[serde(default)]
    pub collections: Collections,
}

impl Default for DeptCalConfig {
    fn default() -> Self {
        DeptCalConfig {
            data_dir: default_data_dir(),
            max_chunk: MAX_CHUNK,
            default_department: None,
            collections: Collections::default(),
        }
    }
}

impl DeptCalConfig {
    pub fn config_path() -> DeptCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DeptCalError::Config("Could not determine config directory".into()))?
            .join("deptcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first if
    /// no config file exists yet.
    pub fn load() -> DeptCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> DeptCalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| DeptCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DeptCalError::Config(e.to_string()))
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            events_collection: self.collections.events.clone(),
            archive_collection: self.collections.archive.clone(),
            bucket_collection: self.collections.bucket.clone(),
            max_chunk: self.max_chunk.clamp(1, MAX_CHUNK),
        }
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> DeptCalResult<()> {
        let contents = format!(
            "\
# deptcal configuration

# Where event collections are stored:
# data_dir = \"{}\"

# Writes per atomic batch (1-{}):
# max_chunk = {}

# Department used when a draft names none:
# default_department = \"main\"

# [collections]
# events = \"{}\"
# archive = \"{}\"
# bucket = \"{}\"
",
            DEFAULT_DATA_DIR,
            MAX_CHUNK,
            MAX_CHUNK,
            DEFAULT_EVENTS_COLLECTION,
            DEFAULT_ARCHIVE_COLLECTION,
            DEFAULT_BUCKET_COLLECTION,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DeptCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DeptCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
