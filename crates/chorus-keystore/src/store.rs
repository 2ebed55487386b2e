use std::io::ErrorKind;
use std::path::PathBuf;

use jiff::Timestamp;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::KeyStoreError;
use crate::types::{CustomKey, CustomKeyView, KeyFile, KeyStatus, OriginalKey, UsageStats};

/// Number of leading secret characters kept when masking for display
const MASK_VISIBLE_CHARS: usize = 10;

/// File-backed store for custom keys, original keys, their mapping, and
/// the usage ledger
///
/// The four entity sets live in one JSON document. Every mutation is a
/// read-modify-write of the whole document, serialized on an async mutex
/// and committed by an atomic rename, so sequential operations never
/// clobber each other's unrelated fields.
pub struct KeyStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl KeyStore {
    /// Create a store backed by the given file path
    ///
    /// The file is created lazily on first write; a missing file reads as
    /// the empty document.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Issue a new custom key
    ///
    /// Generates a fresh unique secret. When `original_key_id` is given it
    /// must reference an existing original key; the corresponding mapping
    /// entry is written in the same commit.
    pub async fn create_custom_key(
        &self,
        name: &str,
        rate_limit: Option<u32>,
        original_key_id: Option<String>,
    ) -> Result<CustomKey, KeyStoreError> {
        if name.trim().is_empty() {
            return Err(KeyStoreError::Validation("Name is required".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;

        if let Some(ref id) = original_key_id
            && !file.original_keys.iter().any(|key| &key.id == id)
        {
            return Err(KeyStoreError::Validation(format!("Unknown original key id: {id}")));
        }

        let key = CustomKey {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            api_key: generate_secret(),
            status: KeyStatus::Active,
            rate_limit: rate_limit.unwrap_or(1000),
            usage_count: 0,
            created_at: Timestamp::now().to_string(),
            last_used: None,
            original_key_id: original_key_id.clone(),
        };

        if let Some(id) = original_key_id {
            file.key_mappings.insert(key.api_key.clone(), id);
        }

        file.custom_keys.push(key.clone());
        self.persist(&file).await?;

        tracing::info!(key_id = %key.id, name = %key.name, "created custom key");
        Ok(key)
    }

    /// Register an upstream credential/endpoint pair
    ///
    /// The credential is stored verbatim; no upstream verification is
    /// attempted.
    pub async fn create_original_key(
        &self,
        name: &str,
        api_key: &str,
        endpoint: &str,
    ) -> Result<OriginalKey, KeyStoreError> {
        if name.trim().is_empty() || api_key.trim().is_empty() || endpoint.trim().is_empty() {
            return Err(KeyStoreError::Validation(
                "Name, API key, and endpoint are required".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;

        let key = OriginalKey {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
            status: KeyStatus::Active,
            usage_count: 0,
            created_at: Timestamp::now().to_string(),
            last_used: None,
        };

        file.original_keys.push(key.clone());
        self.persist(&file).await?;

        tracing::info!(key_id = %key.id, name = %key.name, "created original key");
        Ok(key)
    }

    /// True iff a custom key with this secret exists and is active
    pub async fn validate_custom_key(&self, api_key: &str) -> Result<bool, KeyStoreError> {
        let file = self.load().await?;
        Ok(file
            .custom_keys
            .iter()
            .any(|key| key.api_key == api_key && key.status == KeyStatus::Active))
    }

    /// Look up the full record for a custom key secret
    pub async fn get_key_info(&self, api_key: &str) -> Result<Option<CustomKey>, KeyStoreError> {
        let file = self.load().await?;
        Ok(file.custom_keys.iter().find(|key| key.api_key == api_key).cloned())
    }

    /// Record one call against a custom key
    ///
    /// Increments the key's counter, stamps `lastUsed`, and bumps today's
    /// ledger cell. Silently no-ops when the key no longer exists; never
    /// raises past the caller, so metering cannot fail a request.
    pub async fn record_usage(&self, api_key: &str) {
        if let Err(e) = self.record_usage_inner(api_key).await {
            tracing::warn!(error = %e, "failed to record key usage");
        }
    }

    async fn record_usage_inner(&self, api_key: &str) -> Result<(), KeyStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;

        let Some(key) = file.custom_keys.iter_mut().find(|key| key.api_key == api_key) else {
            return Ok(());
        };

        key.usage_count += 1;
        key.last_used = Some(Timestamp::now().to_string());

        let cell = file
            .usage
            .entry(today_utc())
            .or_default()
            .entry(api_key.to_string())
            .or_insert(0);
        *cell += 1;

        self.persist(&file).await
    }

    /// Resolve a custom key secret to its mapped original key
    ///
    /// Returns `None` when no mapping exists or the target was deleted.
    pub async fn resolve_original_key(&self, custom_api_key: &str) -> Result<Option<OriginalKey>, KeyStoreError> {
        let file = self.load().await?;

        let Some(original_id) = file.key_mappings.get(custom_api_key) else {
            return Ok(None);
        };

        Ok(file.original_keys.iter().find(|key| &key.id == original_id).cloned())
    }

    /// Rewrite the mapping for a custom key secret
    ///
    /// Keeps `originalKeyId` on the matching custom key consistent with
    /// the mapping table.
    pub async fn update_key_mapping(&self, custom_api_key: &str, original_key_id: &str) -> Result<(), KeyStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;

        if !file.original_keys.iter().any(|key| key.id == original_key_id) {
            return Err(KeyStoreError::NotFound("Original API key not found".to_string()));
        }

        file.key_mappings
            .insert(custom_api_key.to_string(), original_key_id.to_string());
        if let Some(key) = file.custom_keys.iter_mut().find(|key| key.api_key == custom_api_key) {
            key.original_key_id = Some(original_key_id.to_string());
        }

        self.persist(&file).await
    }

    /// List custom keys, annotated with the linked original key's name
    ///
    /// When `masked` is set the secret is truncated for display; the
    /// dashboard playground needs the unmasked variant.
    pub async fn list_custom_keys(&self, masked: bool) -> Result<Vec<CustomKeyView>, KeyStoreError> {
        let file = self.load().await?;

        Ok(file
            .custom_keys
            .iter()
            .map(|key| {
                let original_key_name = key.original_key_id.as_ref().and_then(|id| {
                    file.original_keys
                        .iter()
                        .find(|original| &original.id == id)
                        .map(|original| original.name.clone())
                });

                let mut key = key.clone();
                if masked {
                    key.api_key = mask_secret(&key.api_key);
                }

                CustomKeyView { key, original_key_name }
            })
            .collect())
    }

    /// List all original keys
    pub async fn list_original_keys(&self) -> Result<Vec<OriginalKey>, KeyStoreError> {
        let file = self.load().await?;
        Ok(file.original_keys)
    }

    /// Delete a custom key by id
    ///
    /// Also drops the mapping entry keyed by the deleted key's secret.
    pub async fn delete_custom_key(&self, id: &str) -> Result<(), KeyStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;

        let Some(position) = file.custom_keys.iter().position(|key| key.id == id) else {
            return Err(KeyStoreError::NotFound("API key not found".to_string()));
        };

        let removed = file.custom_keys.remove(position);
        file.key_mappings.remove(&removed.api_key);

        self.persist(&file).await?;

        tracing::info!(key_id = %id, "deleted custom key");
        Ok(())
    }

    /// Delete an original key by id, cascading to its referents
    ///
    /// Every custom key linked to it has `originalKeyId` nulled, and every
    /// mapping entry targeting it is removed, in the same commit.
    pub async fn delete_original_key(&self, id: &str) -> Result<(), KeyStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;

        let Some(position) = file.original_keys.iter().position(|key| key.id == id) else {
            return Err(KeyStoreError::NotFound("Original API key not found".to_string()));
        };

        file.original_keys.remove(position);
        file.key_mappings.retain(|_, target| target != id);
        for key in &mut file.custom_keys {
            if key.original_key_id.as_deref() == Some(id) {
                key.original_key_id = None;
            }
        }

        self.persist(&file).await?;

        tracing::info!(key_id = %id, "deleted original key");
        Ok(())
    }

    /// Aggregate usage over the full custom key set plus the raw ledger
    pub async fn usage_stats(&self) -> Result<UsageStats, KeyStoreError> {
        let file = self.load().await?;

        Ok(UsageStats {
            total_keys: file.custom_keys.len(),
            active_keys: file
                .custom_keys
                .iter()
                .filter(|key| key.status == KeyStatus::Active)
                .count(),
            total_usage: file.custom_keys.iter().map(|key| key.usage_count).sum(),
            daily_usage: file.usage,
        })
    }

    async fn load(&self) -> Result<KeyFile, KeyStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(KeyFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Commit the whole document: write a sibling temp file, then rename
    /// over the target so readers never observe a partial state
    async fn persist(&self, file: &KeyFile) -> Result<(), KeyStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(file)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Generate a fresh `sk-` secret
fn generate_secret() -> String {
    format!("sk-{}", Uuid::new_v4().simple())
}

/// Truncate a secret for display
fn mask_secret(api_key: &str) -> String {
    let visible: String = api_key.chars().take(MASK_VISIBLE_CHARS).collect();
    format!("{visible}...")
}

/// Today's calendar date in UTC, YYYY-MM-DD
fn today_utc() -> String {
    let now = Timestamp::now().to_string();
    match now.split_once('T') {
        Some((date, _)) => date.to_string(),
        None => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> KeyStore {
        KeyStore::new(dir.path().join("api-keys.json"))
    }

    #[tokio::test]
    async fn created_keys_have_unique_sk_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let first = store.create_custom_key("alpha", None, None).await.unwrap();
        let second = store.create_custom_key("beta", Some(500), None).await.unwrap();

        assert!(first.api_key.starts_with("sk-"));
        assert!(second.api_key.starts_with("sk-"));
        assert_ne!(first.api_key, second.api_key);
        assert_eq!(first.rate_limit, 1000);
        assert_eq!(second.rate_limit, 500);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let err = store.create_custom_key("  ", None, None).await.unwrap_err();
        assert!(matches!(err, KeyStoreError::Validation(_)));
    }

    #[tokio::test]
    async fn linking_to_unknown_original_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let err = store
            .create_custom_key("alpha", None, Some("no-such-id".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, KeyStoreError::Validation(_)));
    }

    #[tokio::test]
    async fn validate_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let key = store.create_custom_key("alpha", None, None).await.unwrap();
        assert!(store.validate_custom_key(&key.api_key).await.unwrap());
        assert!(!store.validate_custom_key("sk-bogus").await.unwrap());
    }

    #[tokio::test]
    async fn usage_recording_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let key = store.create_custom_key("alpha", None, None).await.unwrap();
        for _ in 0..3 {
            store.record_usage(&key.api_key).await;
        }

        let info = store.get_key_info(&key.api_key).await.unwrap().unwrap();
        assert_eq!(info.usage_count, 3);
        assert!(info.last_used.is_some());

        let stats = store.usage_stats().await.unwrap();
        assert_eq!(stats.total_usage, 3);
        let today = stats.daily_usage.values().next().unwrap();
        assert_eq!(today.get(&key.api_key), Some(&3));
    }

    #[tokio::test]
    async fn usage_recording_ignores_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        // Must not error or create ledger entries
        store.record_usage("sk-gone").await;
        let stats = store.usage_stats().await.unwrap();
        assert_eq!(stats.total_usage, 0);
        assert!(stats.daily_usage.is_empty());
    }

    #[tokio::test]
    async fn mapping_resolves_to_original_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let original = store
            .create_original_key("P1", "up_123", "https://x/tts")
            .await
            .unwrap();
        let custom = store
            .create_custom_key("alpha", None, Some(original.id.clone()))
            .await
            .unwrap();

        let resolved = store.resolve_original_key(&custom.api_key).await.unwrap().unwrap();
        assert_eq!(resolved.id, original.id);
        assert_eq!(resolved.api_key, "up_123");
        assert_eq!(resolved.endpoint, "https://x/tts");
    }

    #[tokio::test]
    async fn deleting_original_key_cascades() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let original = store
            .create_original_key("P1", "up_123", "https://x/tts")
            .await
            .unwrap();
        let first = store
            .create_custom_key("alpha", None, Some(original.id.clone()))
            .await
            .unwrap();
        let second = store
            .create_custom_key("beta", None, Some(original.id.clone()))
            .await
            .unwrap();

        store.delete_original_key(&original.id).await.unwrap();

        for key in [&first, &second] {
            let info = store.get_key_info(&key.api_key).await.unwrap().unwrap();
            assert_eq!(info.original_key_id, None);
            assert!(store.resolve_original_key(&key.api_key).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn deleting_custom_key_removes_its_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let original = store
            .create_original_key("P1", "up_123", "https://x/tts")
            .await
            .unwrap();
        let custom = store
            .create_custom_key("alpha", None, Some(original.id.clone()))
            .await
            .unwrap();

        store.delete_custom_key(&custom.id).await.unwrap();

        assert!(store.get_key_info(&custom.api_key).await.unwrap().is_none());
        assert!(store.resolve_original_key(&custom.api_key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_unknown_ids_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(matches!(
            store.delete_custom_key("missing").await.unwrap_err(),
            KeyStoreError::NotFound(_)
        ));
        assert!(matches!(
            store.delete_original_key("missing").await.unwrap_err(),
            KeyStoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn masked_listing_truncates_secrets_and_names_links() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let original = store
            .create_original_key("P1", "up_123", "https://x/tts")
            .await
            .unwrap();
        let custom = store
            .create_custom_key("alpha", None, Some(original.id))
            .await
            .unwrap();

        let masked = store.list_custom_keys(true).await.unwrap();
        assert_eq!(masked.len(), 1);
        assert_eq!(masked[0].key.api_key, format!("{}...", &custom.api_key[..10]));
        assert_eq!(masked[0].original_key_name.as_deref(), Some("P1"));

        let full = store.list_custom_keys(false).await.unwrap();
        assert_eq!(full[0].key.api_key, custom.api_key);
    }

    #[tokio::test]
    async fn update_key_mapping_rewrites_link() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let first = store
            .create_original_key("P1", "up_1", "https://one/tts")
            .await
            .unwrap();
        let second = store
            .create_original_key("P2", "up_2", "https://two/tts")
            .await
            .unwrap();
        let custom = store
            .create_custom_key("alpha", None, Some(first.id))
            .await
            .unwrap();

        store.update_key_mapping(&custom.api_key, &second.id).await.unwrap();

        let resolved = store.resolve_original_key(&custom.api_key).await.unwrap().unwrap();
        assert_eq!(resolved.api_key, "up_2");
        let info = store.get_key_info(&custom.api_key).await.unwrap().unwrap();
        assert_eq!(info.original_key_id, Some(second.id));
    }

    #[tokio::test]
    async fn store_round_trips_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api-keys.json");

        let key = {
            let store = KeyStore::new(path.clone());
            store.create_custom_key("alpha", None, None).await.unwrap()
        };

        let reopened = KeyStore::new(path);
        let info = reopened.get_key_info(&key.api_key).await.unwrap().unwrap();
        assert_eq!(info.name, "alpha");
    }
}
