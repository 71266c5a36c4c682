//! Length guard applied between script generation and voice synthesis.

use log::warn;
use meditate_rs_config::LimitsConfig;

/// Truncates scripts that exceed the voice provider's input ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthGuard {
    max_chars: usize,
    truncate_to: usize,
    marker: String,
}

impl LengthGuard {
    pub fn new(max_chars: usize, truncate_to: usize, marker: impl Into<String>) -> Self {
        Self {
            max_chars,
            truncate_to,
            marker: marker.into(),
        }
    }

    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self::new(
            limits.max_script_chars,
            limits.truncate_to_chars,
            limits.truncation_marker.clone(),
        )
    }

    /// Return the script unchanged, or its prefix plus the truncation marker.
    ///
    /// Lengths are counted in characters, never splitting a code point.
    pub fn apply(&self, script: String) -> String {
        let len = script.chars().count();
        if len <= self.max_chars {
            return script;
        }
        warn!(
            "script too long, truncating (chars={}, limit={})",
            len, self.max_chars
        );
        let mut truncated: String = script.chars().take(self.truncate_to).collect();
        truncated.push_str(&self.marker);
        truncated
    }
}

impl Default for LengthGuard {
    fn default() -> Self {
        Self::from_limits(&LimitsConfig::default())
    }
}
