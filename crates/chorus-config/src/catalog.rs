use serde::Deserialize;

/// Voice catalog cache configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Maximum cache age in seconds before a re-fetch is triggered
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
        }
    }
}

const fn default_max_age_secs() -> u64 {
    3600
}
