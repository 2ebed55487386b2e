use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use crate::classify::{category_for, gender_for_name, quality_for_engine};
use crate::error::CatalogError;
use crate::types::{CatalogStats, RawVoice, Voice};

/// Body of the catalog probe response
///
/// The provider has no dedicated list endpoint; probing with an invalid
/// voice makes it reject the request with the full list of valid voices
/// attached.
#[derive(Debug, Deserialize)]
struct ProbeResponse {
    #[serde(default)]
    available_voices: Option<Vec<RawVoice>>,
}

/// Cached, enriched snapshot of the upstream voice list
///
/// The snapshot lives in one JSON file whose modification time is the
/// freshness clock. Refreshes replace the whole file atomically; readers
/// never observe a partial catalog.
pub struct VoiceCatalog {
    client: reqwest::Client,
    endpoint: Url,
    api_key: SecretString,
    cache_path: PathBuf,
    max_age: Duration,
    refresh_lock: Mutex<()>,
}

/// Filter set for catalog queries; all present filters must match
#[derive(Debug, Default, Clone)]
pub struct VoiceFilters {
    /// Case-insensitive substring match on the language tag
    pub language: Option<String>,
    /// Case-insensitive exact match
    pub engine: Option<String>,
    /// Case-insensitive exact match
    pub gender: Option<String>,
    /// Case-insensitive exact match
    pub category: Option<String>,
    /// Case-insensitive substring match against name, language, or engine
    pub search: Option<String>,
}

impl VoiceCatalog {
    pub fn new(
        endpoint: Url,
        api_key: SecretString,
        cache_path: PathBuf,
        max_age: Duration,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint,
            api_key,
            cache_path,
            max_age,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Fetch the raw voice list from upstream
    ///
    /// Issues one probe request carrying a deliberately invalid voice
    /// identifier and reads `available_voices` out of the (typically 4xx)
    /// error body.
    pub async fn fetch_from_upstream(&self) -> Result<Vec<RawVoice>, CatalogError> {
        tracing::debug!(endpoint = %self.endpoint, "probing upstream for voice list");

        let response = self
            .client
            .get(self.endpoint.clone())
            .bearer_auth(self.api_key.expose_secret())
            .query(&[("text", "test"), ("voice", "invalid-voice-name")])
            .send()
            .await
            .map_err(|e| CatalogError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(CatalogError::UpstreamUnavailable(format!("upstream status {status}")));
        }

        let body: ProbeResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::UpstreamUnavailable(format!("malformed probe response: {e}")))?;

        body.available_voices
            .ok_or_else(|| CatalogError::UpstreamUnavailable("no available_voices in probe response".to_string()))
    }

    /// Return the catalog, refreshing the cache when it is older than the
    /// freshness window
    ///
    /// A fetch failure falls back to the last cached snapshot regardless
    /// of age, else to an empty catalog; this method never fails a read.
    pub async fn load_all(&self) -> Vec<Voice> {
        if let Some(voices) = self.cached(true).await {
            return voices;
        }

        let _guard = self.refresh_lock.lock().await;

        // A concurrent refresh may have completed while waiting for the lock
        if let Some(voices) = self.cached(true).await {
            return voices;
        }

        match self.fetch_from_upstream().await {
            Ok(raw) => {
                let voices = dedupe_and_enrich(raw);
                if voices.is_empty() {
                    tracing::warn!("upstream reported an empty voice list; not caching");
                } else if let Err(e) = self.persist(&voices).await {
                    tracing::warn!(error = %e, "failed to cache voice catalog");
                } else {
                    tracing::info!(count = voices.len(), "refreshed voice catalog");
                }
                voices
            }
            Err(e) => {
                tracing::warn!(error = %e, "voice fetch failed, falling back to cached snapshot");
                self.cached(false).await.unwrap_or_default()
            }
        }
    }

    /// Discard the cached snapshot and fetch a fresh catalog
    pub async fn force_refresh(&self) -> Result<Vec<Voice>, CatalogError> {
        let _guard = self.refresh_lock.lock().await;

        match tokio::fs::remove_file(&self.cache_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, "failed to remove voice cache"),
        }

        let voices = dedupe_and_enrich(self.fetch_from_upstream().await?);
        if !voices.is_empty()
            && let Err(e) = self.persist(&voices).await
        {
            tracing::warn!(error = %e, "failed to cache voice catalog");
        }

        tracing::info!(count = voices.len(), "force-refreshed voice catalog");
        Ok(voices)
    }

    /// Query the catalog with composed filters
    pub async fn query(&self, filters: &VoiceFilters) -> Vec<Voice> {
        let voices = self.load_all().await;
        voices.into_iter().filter(|voice| filters.matches(voice)).collect()
    }

    /// Look up a voice by its `name-language-engine` id
    pub async fn get_by_id(&self, id: &str) -> Option<Voice> {
        self.load_all().await.into_iter().find(|voice| voice.id == id)
    }

    /// Resolve a voice identifier: full id first, then exact name
    pub async fn resolve(&self, identifier: &str) -> Option<Voice> {
        let voices = self.load_all().await;
        voices
            .iter()
            .find(|voice| voice.id == identifier)
            .or_else(|| voices.iter().find(|voice| voice.name == identifier))
            .cloned()
    }

    /// Frequency tables over the current catalog
    pub async fn stats(&self) -> CatalogStats {
        let voices = self.load_all().await;

        let mut stats = CatalogStats {
            total: voices.len(),
            by_language: std::collections::BTreeMap::new(),
            by_engine: std::collections::BTreeMap::new(),
            by_gender: std::collections::BTreeMap::new(),
            by_category: std::collections::BTreeMap::new(),
        };

        for voice in &voices {
            let prefix = voice.language.split('-').next().unwrap_or(&voice.language);
            *stats.by_language.entry(prefix.to_string()).or_insert(0) += 1;
            *stats.by_engine.entry(voice.engine.clone()).or_insert(0) += 1;
            *stats.by_gender.entry(voice.gender.as_str().to_string()).or_insert(0) += 1;
            *stats.by_category.entry(voice.category.clone()).or_insert(0) += 1;
        }

        stats
    }

    /// Read the cached snapshot; `fresh_only` additionally requires the
    /// file to be younger than the freshness window
    async fn cached(&self, fresh_only: bool) -> Option<Vec<Voice>> {
        let metadata = tokio::fs::metadata(&self.cache_path).await.ok()?;

        if fresh_only {
            let modified = metadata.modified().ok()?;
            let age = SystemTime::now().duration_since(modified).ok()?;
            if age >= self.max_age {
                return None;
            }
        }

        let bytes = tokio::fs::read(&self.cache_path).await.ok()?;
        let voices: Vec<Voice> = serde_json::from_slice(&bytes).ok()?;

        if voices.is_empty() { None } else { Some(voices) }
    }

    async fn persist(&self, voices: &[Voice]) -> Result<(), std::io::Error> {
        if let Some(parent) = self.cache_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(voices).map_err(std::io::Error::other)?;
        let tmp = self.cache_path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.cache_path).await?;
        Ok(())
    }
}

impl VoiceFilters {
    fn matches(&self, voice: &Voice) -> bool {
        if let Some(ref language) = self.language
            && !voice.language.to_lowercase().contains(&language.to_lowercase())
        {
            return false;
        }

        if let Some(ref engine) = self.engine
            && !voice.engine.eq_ignore_ascii_case(engine)
        {
            return false;
        }

        if let Some(ref gender) = self.gender
            && !voice.gender.as_str().eq_ignore_ascii_case(gender)
        {
            return false;
        }

        if let Some(ref category) = self.category
            && !voice.category.eq_ignore_ascii_case(category)
        {
            return false;
        }

        if let Some(ref search) = self.search {
            let term = search.to_lowercase();
            if !voice.name.to_lowercase().contains(&term)
                && !voice.language.to_lowercase().contains(&term)
                && !voice.engine.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        true
    }
}

/// Dedupe the raw list by `(name, language, engine)` (first occurrence
/// wins) and attach derived metadata
pub fn dedupe_and_enrich(raw: Vec<RawVoice>) -> Vec<Voice> {
    let mut seen = HashSet::new();
    let mut voices = Vec::with_capacity(raw.len());

    for voice in raw {
        let id = format!("{}-{}-{}", voice.name, voice.language, voice.engine);
        if !seen.insert(id.clone()) {
            continue;
        }

        voices.push(Voice {
            category: category_for(&voice.name, &voice.language),
            gender: gender_for_name(&voice.name),
            quality: quality_for_engine(&voice.engine),
            id,
            name: voice.name,
            language: voice.language,
            engine: voice.engine,
        });
    }

    voices
}

/// Stable quality ordering for display: high before medium before
/// everything else, preserving prior relative order within a tier
pub fn sort_by_quality(voices: &mut [Voice]) {
    voices.sort_by_key(|voice| voice.quality.rank());
}
