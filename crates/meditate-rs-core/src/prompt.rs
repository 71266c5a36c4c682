//! Generation prompt rendering.

use crate::selection::Selections;

/// Renders the instruction sent to the text generation provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Render the prompt for a set of cleaned selections.
    ///
    /// Output depends only on the selections and their order.
    pub fn build(&self, selections: &Selections) -> String {
        format!(
            "Create a meditation script addressing the following:\n\
Goals: {goals}\n\
Emotions: {emotions}\n\
Desired Outcomes: {outcomes}\n\n\
The script should be supportive and guide the listener through a mindful experience.\n\
Start with a warm welcome message about the purpose of the meditation.\n\
Keep the script concise, around 300-400 words.",
            goals = selections.goals.join(", "),
            emotions = selections.emotions.join(", "),
            outcomes = selections.outcomes.join(", "),
        )
    }
}
