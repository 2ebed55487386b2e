use secrecy::SecretString;
use serde::Deserialize;

/// Dashboard access configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Operator master key checked by the login route
    pub master_key: SecretString,
    /// Session token issued on login and expected on `/dashboard/api/*`
    #[serde(default = "default_session_token")]
    pub session_token: String,
}

fn default_session_token() -> String {
    "dashboard-access".to_string()
}
