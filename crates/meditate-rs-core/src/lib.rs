//! Core generation pipeline for guided meditations.
//!
//! This crate owns selection validation, prompt rendering, the provider
//! clients, the length guard, record persistence, and the orchestrator that
//! sequences them for the HTTP boundary.

pub mod error;
pub mod guard;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod record;
pub mod selection;
pub mod store;

pub use error::MeditationError;
pub use guard::LengthGuard;
pub use pipeline::{PipelineFailure, PipelineOrchestrator, PipelineStage};
pub use prompt::PromptBuilder;
/// Provider interfaces and the default HTTP implementations.
pub use provider::{
    AudioClip, AudioGenerator, AudioStorage, ElevenLabsAudioClient, OpenAiScriptClient,
    ScriptGenerator,
};
pub use record::{
    MeditationRecord, MetadataCodec, MetadataError, NewMeditation, default_title,
    estimate_duration_seconds,
};
pub use selection::{INPUT_FORMAT_MESSAGE, SelectionValidator, Selections};
pub use store::{MeditationStore, SqliteMeditationStore, StoreError};
