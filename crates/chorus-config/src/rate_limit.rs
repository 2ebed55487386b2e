use serde::Deserialize;

/// Per-IP request rate limit for the public API surface
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub requests: u32,
    /// Window duration in seconds
    pub window_secs: u64,
}
