//! Text-to-speech client for voice synthesis.

use super::{AudioClip, AudioGenerator, AudioStorage, snippet};
use crate::error::MeditationError;
use async_trait::async_trait;
use log::{error, info};
use meditate_rs_config::{AudioConfig, Secret};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;

/// Header carrying the provider credential.
const API_KEY_HEADER: &str = "xi-api-key";
/// Raw body prefix used when the error body is not structured.
const RAW_DETAIL_CHARS: usize = 200;

/// Voice synthesis client that persists results through `AudioStorage`.
#[derive(Debug, Clone)]
pub struct ElevenLabsAudioClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Secret,
    model_id: String,
    voice_settings: VoiceSettings,
    storage: AudioStorage,
}

impl ElevenLabsAudioClient {
    /// Build a client; a blank credential fails here, before any request.
    pub fn new(
        config: &AudioConfig,
        api_key: Secret,
        storage: AudioStorage,
    ) -> Result<Self, MeditationError> {
        if api_key.expose().trim().is_empty() {
            error!("voice synthesis credential missing");
            return Err(MeditationError::Configuration(
                "ELEVENLABS_API_KEY is not set in the application configuration".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| {
                error!("failed to build voice synthesis http client: {err}");
                MeditationError::Unexpected("Failed to initialize audio generation.".to_string())
            })?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/v1/text-to-speech/{}",
                config.base_url.trim_end_matches('/'),
                config.voice_id
            ),
            api_key,
            model_id: config.model_id.clone(),
            voice_settings: VoiceSettings {
                stability: config.stability,
                similarity_boost: config.similarity_boost,
            },
            storage,
        })
    }
}

#[async_trait]
impl AudioGenerator for ElevenLabsAudioClient {
    async fn generate_audio(&self, script: &str) -> Result<AudioClip, MeditationError> {
        let request = SpeechRequest {
            text: script,
            model_id: &self.model_id,
            voice_settings: self.voice_settings,
        };
        info!(
            "requesting audio (model_id={}, text_chars={})",
            self.model_id,
            script.chars().count()
        );
        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "audio/mpeg")
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let bytes = response.bytes().await.map_err(classify_transport)?;
        if bytes.is_empty() {
            error!("voice provider returned an empty payload");
            return Err(MeditationError::Provider(
                "Audio generation failed: provider returned no audio".to_string(),
            ));
        }
        let clip = self.storage.persist(&bytes)?;
        info!(
            "audio generated (file={}, bytes={})",
            clip.file_name,
            bytes.len()
        );
        Ok(clip)
    }
}

fn classify_transport(err: reqwest::Error) -> MeditationError {
    if err.is_timeout() {
        error!("audio generation timed out: {err}");
        return MeditationError::ProviderTimeout(
            "Audio generation timed out. Please try again.".to_string(),
        );
    }
    if err.is_connect() {
        error!("voice provider unreachable: {err}");
        return MeditationError::ProviderUnreachable(
            "Could not connect to the audio generation service. Please try again later."
                .to_string(),
        );
    }
    error!("audio generation request failed: {err}");
    MeditationError::Provider("Audio generation failed: request error".to_string())
}

fn classify_status(status: StatusCode, body: &str) -> MeditationError {
    let structured = serde_json::from_str::<Value>(body).ok();
    let detail_status = structured
        .as_ref()
        .and_then(|value| value.pointer("/detail/status"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let detail = structured
        .as_ref()
        .and_then(extract_detail)
        .unwrap_or_else(|| snippet(body, RAW_DETAIL_CHARS));
    error!(
        "voice provider error (status={}, detail={})",
        status.as_u16(),
        detail
    );
    if detail_status.as_deref() == Some("quota_exceeded") {
        return overloaded();
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MeditationError::Configuration(
            "The audio generation service rejected the configured API key.".to_string(),
        ),
        StatusCode::TOO_MANY_REQUESTS => overloaded(),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            MeditationError::ProviderTimeout(
                "Audio generation timed out. Please try again.".to_string(),
            )
        }
        _ => MeditationError::Provider(format!("Audio generation failed: {detail}")),
    }
}

fn overloaded() -> MeditationError {
    MeditationError::ProviderOverloaded(
        "The audio generation service is currently busy. Please try again later.".to_string(),
    )
}

/// Pull a human message out of `{"detail": {"message": ..}}` or `{"detail": ".."}`.
fn extract_detail(value: &Value) -> Option<String> {
    let detail = value.get("detail")?;
    match detail {
        Value::String(message) => Some(message.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}
