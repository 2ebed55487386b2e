use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream credential, dashboard master key,
    /// or rate limit settings are invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_upstream()?;
        self.validate_dashboard()?;
        self.validate_rate_limit()?;
        Ok(())
    }

    fn validate_upstream(&self) -> anyhow::Result<()> {
        if self.upstream.api_key.expose_secret().is_empty() {
            anyhow::bail!("upstream.api_key must not be empty");
        }

        if self.upstream.timeout_secs == 0 {
            anyhow::bail!("upstream.timeout_secs must be greater than 0");
        }

        Ok(())
    }

    fn validate_dashboard(&self) -> anyhow::Result<()> {
        if self.dashboard.master_key.expose_secret().is_empty() {
            anyhow::bail!("dashboard.master_key must not be empty");
        }

        Ok(())
    }

    fn validate_rate_limit(&self) -> anyhow::Result<()> {
        if let Some(ref rate_limit) = self.server.rate_limit {
            if rate_limit.requests == 0 {
                anyhow::bail!("server.rate_limit.requests must be greater than 0");
            }
            if rate_limit.window_secs == 0 {
                anyhow::bail!("server.rate_limit.window_secs must be greater than 0");
            }
        }

        Ok(())
    }
}
