//! Provider credentials resolved once at startup.

use crate::ConfigError;
use crate::loader::env_keys;
use log::error;
use std::fmt;

/// Secret string whose `Debug`/`Display` never reveal the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw secret for an outgoing request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Credentials for the text generation and voice synthesis providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub text_api_key: Secret,
    pub voice_api_key: Secret,
}

impl Credentials {
    pub fn new(text_api_key: impl Into<String>, voice_api_key: impl Into<String>) -> Self {
        Self {
            text_api_key: Secret::new(text_api_key),
            voice_api_key: Secret::new(voice_api_key),
        }
    }

    /// Read both credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read both credentials through a lookup function.
    ///
    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text_api_key = required(&lookup, env_keys::OPENAI_API_KEY)?;
        let voice_api_key = required(&lookup, env_keys::ELEVENLABS_API_KEY)?;
        Ok(Self {
            text_api_key,
            voice_api_key,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<Secret, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(Secret::new(value.trim())),
        _ => {
            error!("{key} is not set in the environment or configuration");
            Err(ConfigError::MissingCredential(key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Credentials, Secret};
    use crate::ConfigError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_both_credentials() {
        let credentials = Credentials::from_lookup(lookup(&[
            ("OPENAI_API_KEY", " sk-text "),
            ("ELEVENLABS_API_KEY", "xi-voice"),
        ]))
        .expect("credentials");
        assert_eq!(credentials.text_api_key.expose(), "sk-text");
        assert_eq!(credentials.voice_api_key.expose(), "xi-voice");
    }

    #[test]
    fn missing_text_key_fails_fast() {
        let err = Credentials::from_lookup(lookup(&[("ELEVENLABS_API_KEY", "xi-voice")]))
            .expect_err("missing key");
        assert!(matches!(err, ConfigError::MissingCredential("OPENAI_API_KEY")));
    }

    #[test]
    fn blank_voice_key_counts_as_missing() {
        let err = Credentials::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-text"),
            ("ELEVENLABS_API_KEY", "   "),
        ]))
        .expect_err("blank key");
        assert_eq!(
            err.to_string(),
            "ELEVENLABS_API_KEY is not set in the environment or configuration"
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let credentials = Credentials::new("sk-very-secret", "xi-very-secret");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("very-secret"));
        assert_eq!(Secret::new("abc").to_string(), "[REDACTED]");
    }
}
