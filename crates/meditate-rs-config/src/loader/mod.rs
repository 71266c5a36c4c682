//! Config file loading, environment overlay, and validation.
//!
//! A single JSON5 file (optional) supplies the policy constants; the process
//! environment then overrides the deployment-specific values. The result is
//! validated once and never re-read.


use crate::{ConfigError, DatabaseLocation, MeditateConfig};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Environment variables consumed at startup.
pub mod env_keys {
    /// Text generation provider credential.
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Voice synthesis provider credential.
    pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
    /// Voice identity override.
    pub const ELEVENLABS_VOICE_ID: &str = "ELEVENLABS_VOICE_ID";
    /// Storage connection string override.
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// HTTP bind address override.
    pub const MEDITATE_BIND: &str = "MEDITATE_BIND";
}

impl MeditateConfig {
    /// Load a config from a JSON5 file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a config from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        let config: MeditateConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, overlay the environment, and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => {
                debug!("no config file given; using defaults");
                Self::default()
            }
        };
        let config = config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay values taken from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values taken from a lookup function; blank values are ignored.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        if let Some(voice_id) = get(env_keys::ELEVENLABS_VOICE_ID) {
            debug!("voice id overridden from environment");
            self.audio.voice_id = voice_id;
        }
        if let Some(database_url) = get(env_keys::DATABASE_URL) {
            debug!("database url overridden from environment");
            self.storage.database_url = database_url;
        }
        if let Some(bind) = get(env_keys::MEDITATE_BIND) {
            debug!("bind address overridden from environment (bind={bind})");
            self.server.bind = bind;
        }
        self
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if limits.max_selections == 0 {
            return Err(invalid("limits.max_selections", "must be greater than 0"));
        }
        if limits.truncate_to_chars == 0 {
            return Err(invalid("limits.truncate_to_chars", "must be greater than 0"));
        }
        let guarded_len = limits.truncate_to_chars + limits.truncation_marker.chars().count();
        if guarded_len > limits.max_script_chars {
            return Err(invalid(
                "limits.truncate_to_chars",
                "truncated script plus marker must fit within max_script_chars",
            ));
        }
        if self.script.timeout_secs == 0 {
            return Err(invalid("script.timeout_secs", "must be greater than 0"));
        }
        if self.script.max_tokens == 0 {
            return Err(invalid("script.max_tokens", "must be greater than 0"));
        }
        if self.script.model.trim().is_empty() {
            return Err(invalid("script.model", "must not be empty"));
        }
        if self.audio.timeout_secs == 0 {
            return Err(invalid("audio.timeout_secs", "must be greater than 0"));
        }
        if self.audio.voice_id.trim().is_empty() {
            return Err(invalid("audio.voice_id", "must not be empty"));
        }
        for (path, value) in [
            ("audio.stability", self.audio.stability),
            ("audio.similarity_boost", self.audio.similarity_boost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(path, "must be between 0.0 and 1.0"));
            }
        }
        if self.audio.file_extension.trim().is_empty()
            || !self
                .audio
                .file_extension
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric())
        {
            return Err(invalid("audio.file_extension", "must be alphanumeric"));
        }
        if !self.server.audio_route.starts_with('/') {
            return Err(invalid("server.audio_route", "must start with '/'"));
        }
        if self.server.audio_route.trim_end_matches('/').is_empty() {
            return Err(invalid("server.audio_route", "must not be the root path"));
        }
        if self.storage.location().is_none() {
            return Err(invalid(
                "storage.database_url",
                "expected a sqlite:// url, a file path, or :memory:",
            ));
        }
        Ok(())
    }

    /// Parsed database location; `validate` guarantees this is present.
    pub fn database_location(&self) -> Option<DatabaseLocation> {
        self.storage.location()
    }
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
