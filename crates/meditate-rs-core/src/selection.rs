//! Selection sanitization and validation.

use crate::error::MeditationError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INPUT_FORMAT_MESSAGE: &str = "Invalid input format. Please refresh and try again.";

/// The three selection categories, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCategory {
    Emotion,
    Goal,
    Outcome,
}

impl SelectionCategory {
    /// Violation reported when a category has no usable entries.
    fn missing_message(self) -> &'static str {
        match self {
            SelectionCategory::Emotion => "Please provide at least one emotion.",
            SelectionCategory::Goal => "Please provide at least one goal.",
            SelectionCategory::Outcome => "Please provide at least one desired outcome.",
        }
    }

    fn field(self) -> &'static str {
        match self {
            SelectionCategory::Emotion => "emotions",
            SelectionCategory::Goal => "goals",
            SelectionCategory::Outcome => "outcomes",
        }
    }
}

/// Cleaned selections: trimmed, blanks removed, order preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selections {
    pub emotions: Vec<String>,
    pub goals: Vec<String>,
    pub outcomes: Vec<String>,
}

impl Selections {
    /// Combined number of entries across all categories.
    pub fn total(&self) -> usize {
        self.emotions.len() + self.goals.len() + self.outcomes.len()
    }
}

/// Sanitizes raw category values and enforces the selection rules.
#[derive(Debug, Clone, Copy)]
pub struct SelectionValidator {
    max_selections: usize,
}

impl SelectionValidator {
    pub fn new(max_selections: usize) -> Self {
        Self { max_selections }
    }

    /// Clean and validate the three raw categories.
    ///
    /// Every violation is collected before failing so callers can surface them
    /// all at once.
    pub fn validate(
        &self,
        emotions: &Value,
        goals: &Value,
        outcomes: &Value,
    ) -> Result<Selections, MeditationError> {
        let selections = Selections {
            emotions: sanitize(SelectionCategory::Emotion, emotions)?,
            goals: sanitize(SelectionCategory::Goal, goals)?,
            outcomes: sanitize(SelectionCategory::Outcome, outcomes)?,
        };

        let mut messages = Vec::new();
        for (category, values) in [
            (SelectionCategory::Emotion, &selections.emotions),
            (SelectionCategory::Goal, &selections.goals),
            (SelectionCategory::Outcome, &selections.outcomes),
        ] {
            if values.is_empty() {
                messages.push(category.missing_message().to_string());
            }
        }
        let total = selections.total();
        if total > self.max_selections {
            messages.push(format!(
                "Please select fewer options for better results (maximum {} total selections).",
                self.max_selections
            ));
        }

        if !messages.is_empty() {
            warn!(
                "selection validation failed (violations={}, total={})",
                messages.len(),
                total
            );
            return Err(MeditationError::ValidationFailed { messages });
        }
        debug!("selections validated (total={total})");
        Ok(selections)
    }
}

/// Trim entries and drop blanks; `null` entries count as blank.
fn sanitize(category: SelectionCategory, raw: &Value) -> Result<Vec<String>, MeditationError> {
    let entries = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        other => {
            warn!(
                "selection category is not a list (field={}, type={})",
                category.field(),
                json_type(other)
            );
            return Err(MeditationError::InputFormat(INPUT_FORMAT_MESSAGE.to_string()));
        }
    };
    let mut cleaned = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::Null => {}
            Value::String(value) => {
                let value = value.trim();
                if !value.is_empty() {
                    cleaned.push(value.to_string());
                }
            }
            other => {
                warn!(
                    "selection entry is not a string (field={}, type={})",
                    category.field(),
                    json_type(other)
                );
                return Err(MeditationError::InputFormat(INPUT_FORMAT_MESSAGE.to_string()));
            }
        }
    }
    Ok(cleaned)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
