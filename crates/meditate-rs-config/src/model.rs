//! Configuration schema for the meditation service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root config for the meditation service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct MeditateConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub script: ScriptConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl MeditateConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> MeditateConfigBuilder {
        MeditateConfigBuilder::new()
    }
}

/// Builder for assembling a `MeditateConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct MeditateConfigBuilder {
    config: MeditateConfig,
}

impl MeditateConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: MeditateConfig::default(),
        }
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the script generation provider configuration.
    pub fn script(mut self, script: ScriptConfig) -> Self {
        self.config.script = script;
        self
    }

    /// Replace the voice synthesis provider configuration.
    pub fn audio(mut self, audio: AudioConfig) -> Self {
        self.config.audio = audio;
        self
    }

    /// Replace the selection and length limits.
    pub fn limits(mut self, limits: LimitsConfig) -> Self {
        self.config.limits = limits;
        self
    }

    /// Replace the persistence configuration.
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Finalize and return the built `MeditateConfig`.
    pub fn build(self) -> MeditateConfig {
        self.config
    }
}

/// HTTP boundary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// URL prefix under which persisted audio files are served.
    #[serde(default = "default_audio_route")]
    pub audio_route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            audio_route: default_audio_route(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_audio_route() -> String {
    "/static/audio".to_string()
}

/// Text generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptConfig {
    #[serde(default = "default_script_base_url")]
    pub base_url: String,
    #[serde(default = "default_script_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_script_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl ScriptConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            base_url: default_script_base_url(),
            model: default_script_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_script_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_script_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_script_model() -> String {
    "gpt-4o".to_string()
}

/// Output token budget for a 300-400 word script with headroom.
fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_script_timeout_secs() -> u64 {
    60
}

fn default_system_prompt() -> String {
    "You are a Wellness Coach specializing in creating meditation scripts.".to_string()
}

/// Voice synthesis provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioConfig {
    #[serde(default = "default_audio_base_url")]
    pub base_url: String,
    #[serde(default = "default_audio_model_id")]
    pub model_id: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_voice_setting")]
    pub stability: f32,
    #[serde(default = "default_voice_setting")]
    pub similarity_boost: f32,
    #[serde(default = "default_audio_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory receiving synthesized audio files.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl AudioConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            base_url: default_audio_base_url(),
            model_id: default_audio_model_id(),
            voice_id: default_voice_id(),
            stability: default_voice_setting(),
            similarity_boost: default_voice_setting(),
            timeout_secs: default_audio_timeout_secs(),
            storage_dir: default_storage_dir(),
            file_extension: default_file_extension(),
        }
    }
}

fn default_audio_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_audio_model_id() -> String {
    "eleven_monolingual_v1".to_string()
}

/// Default voice identity when none is configured.
pub fn default_voice_id() -> String {
    "sX7PMBZDfORL1SPZi4XW".to_string()
}

fn default_voice_setting() -> f32 {
    0.5
}

fn default_audio_timeout_secs() -> u64 {
    90
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("static").join("audio")
}

fn default_file_extension() -> String {
    "mp3".to_string()
}

/// Selection ceiling and length guard policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(default = "default_max_selections")]
    pub max_selections: usize,
    /// Character ceiling accepted by the voice provider.
    #[serde(default = "default_max_script_chars")]
    pub max_script_chars: usize,
    #[serde(default = "default_truncate_to_chars")]
    pub truncate_to_chars: usize,
    #[serde(default = "default_truncation_marker")]
    pub truncation_marker: String,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_selections: default_max_selections(),
            max_script_chars: default_max_script_chars(),
            truncate_to_chars: default_truncate_to_chars(),
            truncation_marker: default_truncation_marker(),
        }
    }
}

fn default_max_selections() -> usize {
    15
}

fn default_max_script_chars() -> usize {
    5000
}

fn default_truncate_to_chars() -> usize {
    4950
}

fn default_truncation_marker() -> String {
    "... [Truncated for length]".to_string()
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://meditations.db".to_string()
}

/// Where the record store lives, parsed from `database_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Process-local database discarded on exit.
    Memory,
    /// SQLite database file.
    File(PathBuf),
}

impl StorageConfig {
    /// Resolve the connection string into a database location.
    ///
    /// Accepts `sqlite://path`, `sqlite:path`, a bare path, or `:memory:`.
    pub fn location(&self) -> Option<DatabaseLocation> {
        let url = self.database_url.trim();
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        if path.is_empty() || (path.contains("://") && !url.starts_with("sqlite")) {
            return None;
        }
        if path == ":memory:" {
            return Some(DatabaseLocation::Memory);
        }
        Some(DatabaseLocation::File(PathBuf::from(path)))
    }
}
