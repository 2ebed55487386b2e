use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    Active,
    Disabled,
}

/// Caller-facing credential issued by the operator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomKey {
    pub id: String,
    /// Operator label
    pub name: String,
    /// Secret token, `sk-` prefixed, unique and immutable after creation
    pub api_key: String,
    pub status: KeyStatus,
    /// Requests per day; recorded but not enforced
    pub rate_limit: u32,
    /// Monotonic call counter
    pub usage_count: u64,
    pub created_at: String,
    pub last_used: Option<String>,
    /// Link to the upstream credential this key is routed against
    pub original_key_id: Option<String>,
}

/// Upstream provider credential/endpoint pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalKey {
    pub id: String,
    pub name: String,
    /// Upstream secret, stored verbatim
    pub api_key: String,
    /// Upstream synthesis base URL
    pub endpoint: String,
    pub status: KeyStatus,
    pub usage_count: u64,
    pub created_at: String,
    pub last_used: Option<String>,
}

/// A custom key annotated with the linked original key's name for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomKeyView {
    #[serde(flatten)]
    pub key: CustomKey,
    pub original_key_name: Option<String>,
}

/// Calendar date (YYYY-MM-DD) → custom `apiKey` → per-day call count
pub type DailyUsage = BTreeMap<String, BTreeMap<String, u64>>;

/// Aggregate usage over the whole custom key set
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_keys: usize,
    pub active_keys: usize,
    pub total_usage: u64,
    pub daily_usage: DailyUsage,
}

/// On-disk document: all four entity sets form one consistency unit and
/// are always read and rewritten together
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KeyFile {
    #[serde(default)]
    pub custom_keys: Vec<CustomKey>,
    #[serde(default)]
    pub original_keys: Vec<OriginalKey>,
    /// Custom `apiKey` string → original key id, indexed by raw secret
    /// for lookup on the forwarding path
    #[serde(default)]
    pub key_mappings: BTreeMap<String, String>,
    #[serde(default)]
    pub usage: DailyUsage,
}
