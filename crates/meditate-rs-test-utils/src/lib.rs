//! Test helpers shared across meditate-rs crates.

pub mod audio;
pub mod fixtures;
pub mod script;
pub mod store;

pub use audio::{FailingAudioGenerator, RecordingAudioGenerator};
pub use fixtures::{request, script_with_words};
pub use script::{FailingScriptGenerator, FixedScriptGenerator};
pub use store::FailingStore;
