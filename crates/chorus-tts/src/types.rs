use chorus_catalog::Voice;
use serde::Deserialize;

/// Speech synthesis request following the `OpenAI` TTS API format
#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    /// Model identifier; accepted for wire compatibility, not used for
    /// routing
    #[serde(default)]
    pub model: Option<String>,
    /// Text to synthesize into speech
    pub input: String,
    /// Voice identifier: full `name-language-engine` id or bare name
    pub voice: String,
    /// Output audio format; only mp3 is supported
    #[serde(default)]
    pub response_format: Option<String>,
    /// Speech speed multiplier (0.25 to 4.0); validated but not forwarded
    #[serde(default)]
    pub speed: Option<f64>,
}

/// Synthesized audio plus the voice it was resolved to
#[derive(Debug)]
pub struct SpeechAudio {
    /// Raw audio bytes (mp3)
    pub audio: Vec<u8>,
    /// The catalog entry the request resolved to, for metadata headers
    pub voice: Voice,
}

impl SpeechAudio {
    /// Convert into an axum HTTP response: raw bytes with metadata
    /// headers, never JSON
    pub fn into_response(self) -> axum::response::Response {
        axum::response::Response::builder()
            .header(http::header::CONTENT_TYPE, "audio/mpeg")
            .header(http::header::CONTENT_LENGTH, self.audio.len())
            .header(http::header::CACHE_CONTROL, "public, max-age=3600")
            .header("X-Voice-Name", self.voice.name)
            .header("X-Voice-Language", self.voice.language)
            .header("X-Voice-Engine", self.voice.engine)
            .body(axum::body::Body::from(self.audio))
            .unwrap_or_else(|_| {
                axum::response::Response::builder()
                    .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                    .body(axum::body::Body::empty())
                    .unwrap()
            })
    }
}
