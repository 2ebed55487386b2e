//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::PathBuf;

use chorus_config::{
    CatalogConfig, Config, DashboardConfig, HealthConfig, RateLimitConfig, ServerConfig, ServiceConfig,
    StorageConfig, UpstreamConfig,
};
use secrecy::SecretString;

/// Master key accepted by test servers
pub const MASTER_KEY: &str = "test-master-key";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder pointed at a mock upstream, with durable state
    /// under the given directory
    pub fn new(upstream_endpoint: &str, data_dir: PathBuf) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                    cors: None,
                    rate_limit: None,
                },
                upstream: UpstreamConfig {
                    endpoint: upstream_endpoint.parse().expect("valid URL"),
                    api_key: SecretString::from("default-upstream-key"),
                    timeout_secs: 5,
                },
                storage: StorageConfig { data_dir },
                catalog: CatalogConfig::default(),
                dashboard: DashboardConfig {
                    master_key: SecretString::from(MASTER_KEY),
                    session_token: "dashboard-access".to_string(),
                },
                service: ServiceConfig::default(),
            },
        }
    }

    /// Enable per-IP rate limiting on the public surface
    pub fn with_rate_limit(mut self, requests: u32, window_secs: u64) -> Self {
        self.config.server.rate_limit = Some(RateLimitConfig { requests, window_secs });
        self
    }

    /// Disable the health endpoints
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
