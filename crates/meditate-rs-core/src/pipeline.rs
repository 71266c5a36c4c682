//! Generation pipeline: validation through persistence.

use crate::error::MeditationError;
use crate::guard::LengthGuard;
use crate::prompt::PromptBuilder;
use crate::provider::{AudioGenerator, ScriptGenerator};
use crate::record::{MeditationRecord, NewMeditation};
use crate::selection::{SelectionValidator, Selections};
use crate::store::MeditationStore;
use log::{debug, error, info};
use meditate_rs_config::LimitsConfig;
use meditate_rs_protocol::{ErrorKind, GenerateMeditationRequest};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Pipeline states in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    ScriptGenerating,
    LengthGuarding,
    AudioGenerating,
    Persisting,
    Completed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Validating => "validating",
            PipelineStage::ScriptGenerating => "script_generating",
            PipelineStage::LengthGuarding => "length_guarding",
            PipelineStage::AudioGenerating => "audio_generating",
            PipelineStage::Persisting => "persisting",
            PipelineStage::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Terminal failure: the stage that failed and its classified error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{stage} failed: {error}")]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    pub error: MeditationError,
}

impl PipelineFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Sequences the generation stages and assembles the persisted record.
pub struct PipelineOrchestrator {
    validator: SelectionValidator,
    prompts: PromptBuilder,
    guard: LengthGuard,
    script: Arc<dyn ScriptGenerator>,
    audio: Arc<dyn AudioGenerator>,
    store: Arc<dyn MeditationStore>,
}

impl PipelineOrchestrator {
    pub fn new(
        limits: &LimitsConfig,
        script: Arc<dyn ScriptGenerator>,
        audio: Arc<dyn AudioGenerator>,
        store: Arc<dyn MeditationStore>,
    ) -> Self {
        Self {
            validator: SelectionValidator::new(limits.max_selections),
            prompts: PromptBuilder::new(),
            guard: LengthGuard::from_limits(limits),
            script,
            audio,
            store,
        }
    }

    /// Store shared with the HTTP boundary for reads and admin operations.
    pub fn store(&self) -> &Arc<dyn MeditationStore> {
        &self.store
    }

    /// Run one request through every stage.
    ///
    /// The first failing stage ends the run; later stages never execute and
    /// nothing is persisted.
    pub async fn generate(
        &self,
        request: &GenerateMeditationRequest,
    ) -> Result<MeditationRecord, PipelineFailure> {
        let selections = self
            .validator
            .validate(&request.emotions, &request.goals, &request.outcomes)
            .map_err(|err| fail(PipelineStage::Validating, None, err))?;

        info!(
            "generating script (emotions={:?}, goals={:?}, outcomes={:?})",
            selections.emotions, selections.goals, selections.outcomes
        );
        let prompt = self.prompts.build(&selections);
        let script = self
            .script
            .generate_script(&prompt)
            .await
            .map_err(|err| fail(PipelineStage::ScriptGenerating, Some(&selections), err))?;
        info!(
            "script generated successfully (chars={})",
            script.chars().count()
        );

        debug!("pipeline stage (stage={})", PipelineStage::LengthGuarding);
        let script = self.guard.apply(script);

        let clip = self
            .audio
            .generate_audio(&script)
            .await
            .map_err(|err| fail(PipelineStage::AudioGenerating, Some(&selections), err))?;

        let meditation = NewMeditation::from_generation(
            &selections,
            script,
            clip.url.clone(),
            request.title.as_deref(),
        );
        let record = match self.store.insert(meditation) {
            Ok(record) => record,
            Err(err) => {
                error!("failed to persist meditation: {err}");
                self.audio.discard(&clip);
                return Err(fail(
                    PipelineStage::Persisting,
                    Some(&selections),
                    MeditationError::Unexpected(
                        "An unexpected error occurred. Please try again later.".to_string(),
                    ),
                ));
            }
        };
        info!(
            "meditation saved (id={}, stage={})",
            record.id,
            PipelineStage::Completed
        );
        Ok(record)
    }
}

/// Log a classified failure with the context needed to reproduce it.
fn fail(
    stage: PipelineStage,
    selections: Option<&Selections>,
    error: MeditationError,
) -> PipelineFailure {
    match selections {
        Some(selections) => error!(
            "pipeline failed (stage={}, kind={:?}, emotions={:?}, goals={:?}, outcomes={:?}, error={})",
            stage,
            error.kind(),
            selections.emotions,
            selections.goals,
            selections.outcomes,
            error
        ),
        None => error!(
            "pipeline failed (stage={}, kind={:?}, error={})",
            stage,
            error.kind(),
            error
        ),
    }
    PipelineFailure { stage, error }
}
