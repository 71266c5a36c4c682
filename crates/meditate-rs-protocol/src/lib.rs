//! Wire protocol types shared by the meditation server and its clients.

mod error;

pub use error::{ApiErrorBody, ErrorKind};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier assigned to a persisted meditation by the store.
pub type MeditationId = i64;

/// Body of `POST /api/generate-meditation`.
///
/// Selection categories are kept as raw JSON so the validator can tell a
/// malformed entry apart from a blank one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerateMeditationRequest {
    #[serde(default)]
    pub emotions: Value,
    #[serde(default)]
    pub goals: Value,
    #[serde(default)]
    pub outcomes: Value,
    /// Explicit title; derived from the selections when absent.
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `POST /api/meditation/{id}/save`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveMeditationRequest {
    #[serde(default = "default_saved")]
    pub saved: bool,
}

impl Default for SaveMeditationRequest {
    fn default() -> Self {
        Self {
            saved: default_saved(),
        }
    }
}

fn default_saved() -> bool {
    true
}

/// Public representation of a persisted meditation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeditationView {
    pub id: MeditationId,
    pub title: Option<String>,
    pub script: String,
    pub audio_url: String,
    pub duration_seconds: Option<u32>,
    pub emotions: Option<Vec<String>>,
    pub goals: Option<Vec<String>>,
    pub outcomes: Option<Vec<String>>,
    pub is_saved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
