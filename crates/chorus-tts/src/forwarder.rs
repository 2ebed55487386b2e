use std::sync::Arc;
use std::time::Duration;

use chorus_catalog::VoiceCatalog;
use chorus_keystore::KeyStore;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::error::TtsError;
use crate::http_client::http_client;
use crate::types::{SpeechAudio, SpeechRequest};

/// Maximum input length accepted for synthesis
const MAX_INPUT_CHARS: usize = 4096;

/// Body of the upstream synthesis response
#[derive(Debug, Deserialize)]
struct SynthResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Forwards validated speech requests to the upstream provider
///
/// Pure `request → audio | error` with no transport framing, so the
/// public route and the dashboard test route call the same path. Usage
/// metering stays with the caller.
pub struct Forwarder {
    client: reqwest::Client,
    keys: Arc<KeyStore>,
    catalog: Arc<VoiceCatalog>,
    default_endpoint: Url,
    default_api_key: SecretString,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(
        keys: Arc<KeyStore>,
        catalog: Arc<VoiceCatalog>,
        default_endpoint: Url,
        default_api_key: SecretString,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(),
            keys,
            catalog,
            default_endpoint,
            default_api_key,
            timeout,
        }
    }

    /// Synthesize speech for a validated request
    ///
    /// Resolves the caller's upstream credential (falling back to the
    /// process-wide default), calls the provider, downloads the returned
    /// audio URL, and hands back the raw bytes.
    pub async fn synthesize(&self, request: &SpeechRequest, caller_api_key: Option<&str>) -> crate::Result<SpeechAudio> {
        tracing::debug!(
            model = request.model.as_deref().unwrap_or("-"),
            voice = %request.voice,
            input_len = request.input.len(),
            "TTS request received"
        );

        // Cheap validation first; none of these touch the network
        if request.input.is_empty() {
            return Err(TtsError::Validation(
                "Input text is required and must be a string".to_string(),
            ));
        }
        if request.voice.is_empty() {
            return Err(TtsError::Validation("Voice is required and must be a string".to_string()));
        }
        if request.input.chars().count() > MAX_INPUT_CHARS {
            return Err(TtsError::Validation(format!(
                "Input text is too long. Maximum length is {MAX_INPUT_CHARS} characters."
            )));
        }
        if request.response_format.as_deref().unwrap_or("mp3") != "mp3" {
            return Err(TtsError::Validation("Only mp3 response format is supported".to_string()));
        }
        let speed = request.speed.unwrap_or(1.0);
        if !(0.25..=4.0).contains(&speed) {
            return Err(TtsError::Validation("Speed must be between 0.25 and 4.0".to_string()));
        }

        let voice = self
            .catalog
            .resolve(&request.voice)
            .await
            .ok_or_else(|| TtsError::VoiceNotFound(request.voice.clone()))?;

        let (endpoint, bearer) = self.resolve_credentials(caller_api_key).await;

        tracing::debug!(voice = %voice.name, language = %voice.language, engine = %voice.engine, "calling upstream");

        let response = self
            .client
            .get(endpoint)
            .bearer_auth(&bearer)
            .query(&[
                ("text", request.input.as_str()),
                ("voice", voice.name.as_str()),
                ("language", voice.language.as_str()),
                ("engine", voice.engine.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "upstream rejected synthesis call");
            return Err(match status.as_u16() {
                401 => TtsError::UpstreamAuth,
                404 => TtsError::UpstreamVoiceGone,
                429 => TtsError::UpstreamRateLimited,
                code => TtsError::UpstreamStatus(code),
            });
        }

        // A 2xx with `ok: false` is an application-level rejection, not a
        // transport failure
        let body: SynthResponse = response
            .json()
            .await
            .map_err(|e| TtsError::Internal(format!("malformed upstream response: {e}")))?;

        if !body.ok {
            return Err(TtsError::Rejected(
                body.message.unwrap_or_else(|| "TTS generation failed".to_string()),
            ));
        }

        let audio_url = body.url.ok_or(TtsError::MissingAudioUrl)?;

        tracing::debug!(url = %audio_url, "downloading audio");

        let audio_response = self
            .client
            .get(&audio_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        if !audio_response.status().is_success() {
            return Err(TtsError::UpstreamStatus(audio_response.status().as_u16()));
        }

        let audio = audio_response
            .bytes()
            .await
            .map_err(|e| TtsError::Internal(format!("failed to read audio body: {e}")))?;

        tracing::debug!(bytes = audio.len(), "audio downloaded");

        Ok(SpeechAudio {
            audio: audio.to_vec(),
            voice,
        })
    }

    /// Pick the upstream credential for a caller
    ///
    /// A custom key with a live original-key mapping routes to that
    /// credential; anything else (no key, unknown key, no mapping, store
    /// failure) falls back to the process-wide default.
    async fn resolve_credentials(&self, caller_api_key: Option<&str>) -> (Url, String) {
        let default = || {
            (
                self.default_endpoint.clone(),
                self.default_api_key.expose_secret().to_string(),
            )
        };

        let Some(api_key) = caller_api_key else {
            return default();
        };

        match self.keys.resolve_original_key(api_key).await {
            Ok(Some(original)) => match original.endpoint.parse::<Url>() {
                Ok(endpoint) => {
                    tracing::debug!(original_key = %original.name, "using mapped upstream credential");
                    (endpoint, original.api_key)
                }
                Err(e) => {
                    tracing::warn!(original_key = %original.name, error = %e, "invalid mapped endpoint, using default");
                    default()
                }
            },
            Ok(None) => default(),
            Err(e) => {
                tracing::warn!(error = %e, "credential resolution failed, using default");
                default()
            }
        }
    }
}

/// Map a transport failure to its taxonomy kind
fn transport_error(error: reqwest::Error) -> TtsError {
    if error.is_timeout() {
        TtsError::Timeout
    } else {
        TtsError::Unavailable
    }
}
