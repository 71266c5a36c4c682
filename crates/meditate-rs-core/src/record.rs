//! Meditation record model and metadata encoding.

use crate::selection::Selections;
use chrono::{DateTime, Utc};
use meditate_rs_protocol::{MeditationId, MeditationView};
use thiserror::Error;

/// Fallback title parts when a category is empty.
const DEFAULT_TITLE_EMOTION: &str = "Calm";
const DEFAULT_TITLE_GOAL: &str = "Mindfulness";

/// Persisted meditation artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct MeditationRecord {
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

impl MeditationRecord {
    /// Public representation returned by the HTTP boundary.
    pub fn to_view(&self) -> MeditationView {
        MeditationView {
            id: self.id,
            title: self.title.clone(),
            script: self.script.clone(),
            audio_url: self.audio_url.clone(),
            duration_seconds: self.duration_seconds,
            emotions: self.emotions.clone(),
            goals: self.goals.clone(),
            outcomes: self.outcomes.clone(),
            is_saved: self.is_saved,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeditation {
    pub title: Option<String>,
    pub script: String,
    pub audio_url: String,
    pub duration_seconds: Option<u32>,
    pub emotions: Option<Vec<String>>,
    pub goals: Option<Vec<String>>,
    pub outcomes: Option<Vec<String>>,
}

impl NewMeditation {
    /// Assemble a record from a finished generation run.
    ///
    /// A non-blank explicit title wins over the derived one.
    pub fn from_generation(
        selections: &Selections,
        script: String,
        audio_url: String,
        explicit_title: Option<&str>,
    ) -> Self {
        let title = explicit_title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_title(&selections.emotions, &selections.goals));
        let duration_seconds = Some(estimate_duration_seconds(&script));
        Self {
            title: Some(title),
            script,
            audio_url,
            duration_seconds,
            emotions: Some(selections.emotions.clone()),
            goals: Some(selections.goals.clone()),
            outcomes: Some(selections.outcomes.clone()),
        }
    }
}

/// `"{first emotion} {first goal} Meditation"` with fallbacks for empty lists.
pub fn default_title(emotions: &[String], goals: &[String]) -> String {
    let emotion = emotions
        .first()
        .map(String::as_str)
        .unwrap_or(DEFAULT_TITLE_EMOTION);
    let goal = goals.first().map(String::as_str).unwrap_or(DEFAULT_TITLE_GOAL);
    format!("{emotion} {goal} Meditation")
}

/// Spoken duration estimate: `floor(words * 0.4)` seconds.
pub fn estimate_duration_seconds(script: &str) -> u32 {
    let words = script.split_whitespace().count() as u64;
    u32::try_from(words * 2 / 5).unwrap_or(u32::MAX)
}

/// Errors raised while decoding persisted metadata.
#[derive(Debug, Error)]
#[error("invalid metadata encoding: {0}")]
pub struct MetadataError(#[from] serde_json::Error);

/// Single encode/decode contract shared by every metadata column.
///
/// Lists are stored as a JSON array of strings, which round-trips any list
/// exactly, including the empty list and entries containing separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataCodec;

impl MetadataCodec {
    pub fn encode(values: &[String]) -> String {
        serde_json::Value::from(values.to_vec()).to_string()
    }

    pub fn decode(encoded: &str) -> Result<Vec<String>, MetadataError> {
        Ok(serde_json::from_str(encoded)?)
    }

    pub fn encode_optional(values: Option<&[String]>) -> Option<String> {
        values.map(Self::encode)
    }

    pub fn decode_optional(encoded: Option<&str>) -> Result<Option<Vec<String>>, MetadataError> {
        encoded.map(Self::decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        MetadataCodec, NewMeditation, default_title, estimate_duration_seconds,
    };
    use crate::selection::Selections;
    use pretty_assertions::assert_eq;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn codec_round_trips_lists() {
        for values in [
            Vec::new(),
            strings(&["Calm"]),
            strings(&["a, b", "\"quoted\"", "[x]", "émotion", "tab\there"]),
        ] {
            let encoded = MetadataCodec::encode(&values);
            assert_eq!(MetadataCodec::decode(&encoded).expect("decode"), values);
            assert_eq!(
                MetadataCodec::encode(&MetadataCodec::decode(&encoded).expect("decode")),
                encoded
            );
        }
    }

    #[test]
    fn codec_encodes_empty_list_as_empty_array() {
        assert_eq!(MetadataCodec::encode(&[]), "[]");
        assert_eq!(MetadataCodec::decode_optional(None).expect("none"), None);
    }

    #[test]
    fn codec_rejects_malformed_input() {
        assert!(MetadataCodec::decode("Calm,Focus").is_err());
        assert!(MetadataCodec::decode("[1, 2]").is_err());
    }

    #[test]
    fn duration_estimate_floors_word_count() {
        let hundred = vec!["word"; 100].join(" ");
        assert_eq!(estimate_duration_seconds(&hundred), 40);
        assert_eq!(estimate_duration_seconds("one two three"), 1);
        assert_eq!(estimate_duration_seconds(""), 0);
    }

    #[test]
    fn default_title_uses_first_entries() {
        assert_eq!(
            default_title(&strings(&["Happy", "Sad"]), &strings(&["Focus"])),
            "Happy Focus Meditation"
        );
        assert_eq!(default_title(&[], &[]), "Calm Mindfulness Meditation");
    }

    #[test]
    fn explicit_title_overrides_derived_title() {
        let selections = Selections {
            emotions: strings(&["Happy"]),
            goals: strings(&["Focus"]),
            outcomes: strings(&["Clarity"]),
        };
        let titled = NewMeditation::from_generation(
            &selections,
            "script".to_string(),
            "/static/audio/a.mp3".to_string(),
            Some("  Morning Reset "),
        );
        assert_eq!(titled.title.as_deref(), Some("Morning Reset"));

        let blank = NewMeditation::from_generation(
            &selections,
            "script".to_string(),
            "/static/audio/a.mp3".to_string(),
            Some("   "),
        );
        assert_eq!(blank.title.as_deref(), Some("Happy Focus Meditation"));
        assert_eq!(blank.outcomes, Some(strings(&["Clarity"])));
    }
}
