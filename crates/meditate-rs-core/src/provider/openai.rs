//! Chat-completions client for script generation.

use super::{ScriptGenerator, snippet};
use crate::error::MeditationError;
use async_trait::async_trait;
use log::{debug, error, info};
use meditate_rs_config::{ScriptConfig, Secret};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Error codes the provider uses when a request blows the token budget.
const TOO_COMPLEX_CODES: &[&str] = &["context_length_exceeded", "max_tokens_exceeded"];

const TOO_COMPLEX_MESSAGE: &str =
    "Your meditation request was too complex. Please select fewer options and try again.";

/// Script generation client for an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiScriptClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Secret,
    model: String,
    max_tokens: u32,
    temperature: f32,
    system_prompt: String,
}

impl OpenAiScriptClient {
    /// Build a client; a blank credential fails here, before any request.
    pub fn new(config: &ScriptConfig, api_key: Secret) -> Result<Self, MeditationError> {
        if api_key.expose().trim().is_empty() {
            error!("text generation credential missing");
            return Err(MeditationError::Configuration(
                "OPENAI_API_KEY is not set in the application configuration".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| {
                error!("failed to build text generation http client: {err}");
                MeditationError::Unexpected("Failed to initialize script generation.".to_string())
            })?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
        })
    }
}

#[async_trait]
impl ScriptGenerator for OpenAiScriptClient {
    async fn generate_script(&self, prompt: &str) -> Result<String, MeditationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        info!(
            "requesting script (model={}, prompt_len={}, max_tokens={})",
            self.model,
            prompt.len(),
            self.max_tokens
        );
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport)?;
        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|err| {
            error!("unreadable script response (err={err}, body={})", snippet(&body, 200));
            MeditationError::Provider(
                "Script generation failed: unreadable provider response".to_string(),
            )
        })?;
        let Some(choice) = parsed.choices.into_iter().next() else {
            error!("script response had no choices");
            return Err(MeditationError::Provider(
                "Script generation failed: provider returned no script".to_string(),
            ));
        };
        if choice.finish_reason.as_deref() == Some("length") {
            error!("script hit the output token budget (max_tokens={})", self.max_tokens);
            return Err(MeditationError::RequestTooComplex(TOO_COMPLEX_MESSAGE.to_string()));
        }
        let script = choice.message.content.unwrap_or_default().trim().to_string();
        if script.is_empty() {
            error!("script response was empty");
            return Err(MeditationError::Provider(
                "Script generation failed: provider returned an empty script".to_string(),
            ));
        }
        debug!("script generated (chars={})", script.chars().count());
        Ok(script)
    }
}

fn classify_transport(err: reqwest::Error) -> MeditationError {
    if err.is_timeout() {
        error!("script generation timed out: {err}");
        return MeditationError::ProviderTimeout(
            "Script generation timed out. Please try again.".to_string(),
        );
    }
    error!("script generation request failed: {err}");
    MeditationError::Provider(format!(
        "Script generation failed: {}",
        transport_summary(&err)
    ))
}

fn transport_summary(err: &reqwest::Error) -> &'static str {
    if err.is_connect() {
        "could not connect to the provider"
    } else if err.is_body() || err.is_decode() {
        "incomplete provider response"
    } else {
        "request error"
    }
}

fn classify_status(status: StatusCode, body: &str) -> MeditationError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);
    let message = detail
        .as_ref()
        .and_then(|detail| detail.message.clone())
        .unwrap_or_else(|| snippet(body, 200));
    error!(
        "script provider error (status={}, detail={})",
        status.as_u16(),
        message
    );
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MeditationError::Configuration(
            "The script generation service rejected the configured API key.".to_string(),
        ),
        StatusCode::TOO_MANY_REQUESTS => MeditationError::ProviderOverloaded(
            "The meditation service is currently busy. Please try again later.".to_string(),
        ),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            MeditationError::ProviderTimeout(
                "Script generation timed out. Please try again.".to_string(),
            )
        }
        _ if detail.as_ref().is_some_and(ProviderErrorDetail::is_token_budget) => {
            MeditationError::RequestTooComplex(TOO_COMPLEX_MESSAGE.to_string())
        }
        _ => MeditationError::Provider(format!("Script generation failed: {message}")),
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ProviderErrorDetail {
    fn is_token_budget(&self) -> bool {
        let code_matches = self
            .code
            .as_deref()
            .is_some_and(|code| TOO_COMPLEX_CODES.contains(&code));
        let message_matches = self.message.as_deref().is_some_and(|message| {
            message.contains("maximum context length") || message.contains("max_tokens")
        });
        code_matches || message_matches
    }
}
