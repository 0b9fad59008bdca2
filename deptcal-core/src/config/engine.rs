//! Engine settings.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ARCHIVE_COLLECTION, DEFAULT_BUCKET_COLLECTION, DEFAULT_EVENTS_COLLECTION, MAX_CHUNK,
};

/// Collection names and chunk size the engine works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub events_collection: String,
    pub archive_collection: String,
    pub bucket_collection: String,
    pub max_chunk: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            events_collection: DEFAULT_EVENTS_COLLECTION.to_string(),
            archive_collection: DEFAULT_ARCHIVE_COLLECTION.to_string(),
            bucket_collection: DEFAULT_BUCKET_COLLECTION.to_string(),
            max_chunk: MAX_CHUNK,
        }
    }
}
