//! External generation providers: text generation and voice synthesis.

mod elevenlabs;
mod openai;
mod storage;

pub use elevenlabs::ElevenLabsAudioClient;
pub use openai::OpenAiScriptClient;
pub use storage::{AudioClip, AudioStorage};

use crate::error::MeditationError;
use async_trait::async_trait;
use log::warn;

/// Text generation provider interface.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Generate a script for the prompt; returns trimmed text.
    async fn generate_script(&self, prompt: &str) -> Result<String, MeditationError>;
}

/// Voice synthesis provider interface.
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    /// Synthesize the script and persist the audio, returning its reference.
    async fn generate_audio(&self, script: &str) -> Result<AudioClip, MeditationError>;

    /// Remove a previously persisted clip.
    fn discard(&self, clip: &AudioClip) {
        match std::fs::remove_file(&clip.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!(
                "failed to discard audio clip (path={}, err={})",
                clip.path.display(),
                err
            ),
        }
    }
}

/// Truncate provider text for inclusion in messages and logs.
pub(crate) fn snippet(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
