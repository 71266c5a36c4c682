use meditate_rs_core::{MeditationRecord, MeditationStore, NewMeditation, StoreError};
use meditate_rs_protocol::MeditationId;
use parking_lot::Mutex;
use std::sync::Arc;

/// Store whose every operation fails, counting insert attempts.
#[derive(Debug, Clone, Default)]
pub struct FailingStore {
    inserts: Arc<Mutex<usize>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inserts(&self) -> usize {
        *self.inserts.lock()
    }

    fn failure() -> StoreError {
        StoreError::Io(std::io::Error::other("disk full"))
    }
}

impl MeditationStore for FailingStore {
    fn insert(&self, _meditation: NewMeditation) -> Result<MeditationRecord, StoreError> {
        *self.inserts.lock() += 1;
        Err(Self::failure())
    }

    fn get(&self, _id: MeditationId) -> Result<Option<MeditationRecord>, StoreError> {
        Err(Self::failure())
    }

    fn list_recent(&self, _limit: usize) -> Result<Vec<MeditationRecord>, StoreError> {
        Err(Self::failure())
    }

    fn set_saved(
        &self,
        _id: MeditationId,
        _saved: bool,
    ) -> Result<Option<MeditationRecord>, StoreError> {
        Err(Self::failure())
    }

    fn reset(&self) -> Result<(), StoreError> {
        Err(Self::failure())
    }
}
