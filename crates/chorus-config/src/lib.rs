#![allow(clippy::must_use_candidate)]

pub mod catalog;
pub mod cors;
pub mod dashboard;
mod env;
pub mod health;
mod loader;
pub mod rate_limit;
pub mod server;
pub mod service;
pub mod storage;
pub mod upstream;

use serde::Deserialize;

pub use catalog::*;
pub use cors::*;
pub use dashboard::*;
pub use health::*;
pub use rate_limit::*;
pub use server::*;
pub use service::*;
pub use storage::*;
pub use upstream::*;

/// Top-level Chorus configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Default upstream TTS provider credential and endpoint
    pub upstream: UpstreamConfig,
    /// Durable storage locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Voice catalog cache configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Dashboard access configuration
    pub dashboard: DashboardConfig,
    /// Service identity reported by health endpoints
    #[serde(default)]
    pub service: ServiceConfig,
}
