use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Default upstream TTS provider
///
/// Used for requests whose custom key has no original-key mapping, and
/// for voice catalog fetches.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Synthesis endpoint
    pub endpoint: Url,
    /// Bearer credential for the default upstream account
    pub api_key: SecretString,
    /// Outbound call timeout in seconds (applies to the synthesis call
    /// and the audio download independently)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}
