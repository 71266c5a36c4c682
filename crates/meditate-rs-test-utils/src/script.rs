use async_trait::async_trait;
use meditate_rs_core::{MeditationError, ScriptGenerator};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FixedScriptGenerator {
    script: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FixedScriptGenerator {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl ScriptGenerator for FixedScriptGenerator {
    async fn generate_script(&self, prompt: &str) -> Result<String, MeditationError> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.script.trim().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FailingScriptGenerator {
    error: MeditationError,
    calls: Arc<Mutex<usize>>,
}

impl FailingScriptGenerator {
    pub fn new(error: MeditationError) -> Self {
        Self {
            error,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl ScriptGenerator for FailingScriptGenerator {
    async fn generate_script(&self, _prompt: &str) -> Result<String, MeditationError> {
        *self.calls.lock() += 1;
        Err(self.error.clone())
    }
}
