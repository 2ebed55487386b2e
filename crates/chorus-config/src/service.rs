use serde::Deserialize;

/// Service identity reported by health endpoints
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
        }
    }
}

fn default_name() -> String {
    "chorus".to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
