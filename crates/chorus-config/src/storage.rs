use std::path::PathBuf;

use serde::Deserialize;

/// Durable storage locations
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the key store file and the voice cache file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Path of the key store document
    pub fn key_file(&self) -> PathBuf {
        self.data_dir.join("api-keys.json")
    }

    /// Path of the cached voice catalog
    pub fn voice_cache_file(&self) -> PathBuf {
        self.data_dir.join("voices.json")
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
