use meditate_rs_core::{MeditationStore, PipelineOrchestrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<PipelineOrchestrator>,
    audio_route: String,
    audio_dir: PathBuf,
}

impl AppState {
    /// `audio_route` is the URL prefix the generated audio references use;
    /// `audio_dir` is the directory those files are written to.
    pub fn new(
        orchestrator: Arc<PipelineOrchestrator>,
        audio_route: impl Into<String>,
        audio_dir: impl Into<PathBuf>,
    ) -> Self {
        let audio_route: String = audio_route.into();
        Self {
            orchestrator,
            audio_route: audio_route.trim_end_matches('/').to_string(),
            audio_dir: audio_dir.into(),
        }
    }

    pub fn orchestrator(&self) -> &PipelineOrchestrator {
        &self.orchestrator
    }

    pub fn store(&self) -> &Arc<dyn MeditationStore> {
        self.orchestrator.store()
    }

    pub fn audio_route(&self) -> &str {
        &self.audio_route
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }
}
