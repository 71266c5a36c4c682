use async_trait::async_trait;
use meditate_rs_core::{AudioClip, AudioGenerator, AudioStorage, MeditationError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Persists a fixed payload through real storage and records each script.
#[derive(Debug, Clone)]
pub struct RecordingAudioGenerator {
    storage: AudioStorage,
    payload: Vec<u8>,
    scripts: Arc<Mutex<Vec<String>>>,
    discarded: Arc<Mutex<Vec<AudioClip>>>,
}

impl RecordingAudioGenerator {
    pub fn new(storage: AudioStorage) -> Self {
        Self {
            storage,
            payload: b"ID3\x04fake-mpeg-frames".to_vec(),
            scripts: Arc::new(Mutex::new(Vec::new())),
            discarded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.scripts.lock().len()
    }

    pub fn discarded(&self) -> Vec<AudioClip> {
        self.discarded.lock().clone()
    }
}

#[async_trait]
impl AudioGenerator for RecordingAudioGenerator {
    async fn generate_audio(&self, script: &str) -> Result<AudioClip, MeditationError> {
        self.scripts.lock().push(script.to_string());
        self.storage.persist(&self.payload)
    }

    fn discard(&self, clip: &AudioClip) {
        self.discarded.lock().push(clip.clone());
        let _ = std::fs::remove_file(&clip.path);
    }
}

#[derive(Debug, Clone)]
pub struct FailingAudioGenerator {
    error: MeditationError,
    calls: Arc<Mutex<usize>>,
}

impl FailingAudioGenerator {
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
impl AudioGenerator for FailingAudioGenerator {
    async fn generate_audio(&self, _script: &str) -> Result<AudioClip, MeditationError> {
        *self.calls.lock() += 1;
        Err(self.error.clone())
    }
}
