//! Pipeline integration tests with stub providers.

use meditate_rs_config::LimitsConfig;
use meditate_rs_core::{
    AudioStorage, MeditationError, MeditationStore, PipelineOrchestrator, PipelineStage,
    SqliteMeditationStore,
};
use meditate_rs_protocol::ErrorKind;
use meditate_rs_test_utils::{
    FailingAudioGenerator, FailingScriptGenerator, FailingStore, FixedScriptGenerator,
    RecordingAudioGenerator, request, script_with_words,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn storage(root: &Path) -> AudioStorage {
    AudioStorage::new(root, "/static/audio", "mp3")
}

fn file_count(root: &Path) -> usize {
    if !root.exists() {
        return 0;
    }
    std::fs::read_dir(root).expect("read dir").count()
}

/// Happy path: every stage runs and the record is persisted intact.
#[tokio::test]
async fn generates_and_persists_meditation() {
    let temp = tempdir().expect("tempdir");
    let audio_root = temp.path().join("audio");
    let script = FixedScriptGenerator::new(script_with_words(200));
    let audio = RecordingAudioGenerator::new(storage(&audio_root));
    let store = Arc::new(SqliteMeditationStore::open_in_memory().expect("store"));
    let orchestrator = PipelineOrchestrator::new(
        &LimitsConfig::default(),
        Arc::new(script.clone()),
        Arc::new(audio.clone()),
        store.clone(),
    );

    let record = orchestrator
        .generate(&request(&["Calm"], &["Relaxation"], &["Feeling Calm"]))
        .await
        .expect("generate");

    let prompts = script.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Calm"));
    assert!(prompts[0].contains("Relaxation"));
    assert!(prompts[0].contains("Feeling Calm"));

    assert_eq!(audio.scripts(), vec![script_with_words(200)]);
    assert_eq!(record.script, script_with_words(200));
    assert_eq!(record.duration_seconds, Some(80));
    assert_eq!(record.title.as_deref(), Some("Calm Relaxation Meditation"));
    assert_eq!(record.emotions, Some(vec!["Calm".to_string()]));
    assert_eq!(record.goals, Some(vec!["Relaxation".to_string()]));
    assert_eq!(record.outcomes, Some(vec!["Feeling Calm".to_string()]));
    assert!(!record.is_saved);
    assert!(record.audio_url.starts_with("/static/audio/meditation_"));
    assert_eq!(file_count(&audio_root), 1);

    let stored = store.get(record.id).expect("get").expect("record");
    assert_eq!(stored, record);
}

#[tokio::test]
async fn explicit_title_is_kept() {
    let temp = tempdir().expect("tempdir");
    let store = Arc::new(SqliteMeditationStore::open_in_memory().expect("store"));
    let orchestrator = PipelineOrchestrator::new(
        &LimitsConfig::default(),
        Arc::new(FixedScriptGenerator::new(script_with_words(10))),
        Arc::new(RecordingAudioGenerator::new(storage(temp.path()))),
        store,
    );
    let mut input = request(&["Happy", "Sad"], &["Focus"], &["Clarity"]);
    input.title = Some("Evening Wind-Down".to_string());

    let record = orchestrator.generate(&input).await.expect("generate");
    assert_eq!(record.title.as_deref(), Some("Evening Wind-Down"));
    assert_eq!(record.duration_seconds, Some(4));
}

/// Over-long scripts reach the voice provider truncated, never failing the run.
#[tokio::test]
async fn long_script_is_truncated_before_audio() {
    let temp = tempdir().expect("tempdir");
    let audio = RecordingAudioGenerator::new(storage(temp.path()));
    let orchestrator = PipelineOrchestrator::new(
        &LimitsConfig::default(),
        Arc::new(FixedScriptGenerator::new("a".repeat(6000))),
        Arc::new(audio.clone()),
        Arc::new(SqliteMeditationStore::open_in_memory().expect("store")),
    );

    let record = orchestrator
        .generate(&request(&["Calm"], &["Sleep"], &["Rest"]))
        .await
        .expect("generate");

    let expected = format!("{}... [Truncated for length]", "a".repeat(4950));
    assert_eq!(audio.scripts(), vec![expected.clone()]);
    assert_eq!(record.script, expected);
}

/// Validation failures stop before any provider is called.
#[tokio::test]
async fn validation_failure_short_circuits() {
    let temp = tempdir().expect("tempdir");
    let script = FixedScriptGenerator::new("unused");
    let audio = RecordingAudioGenerator::new(storage(temp.path()));
    let store = Arc::new(SqliteMeditationStore::open_in_memory().expect("store"));
    let orchestrator = PipelineOrchestrator::new(
        &LimitsConfig::default(),
        Arc::new(script.clone()),
        Arc::new(audio.clone()),
        store.clone(),
    );

    let failure = orchestrator
        .generate(&request(&[" "], &[], &["Peace"]))
        .await
        .expect_err("invalid");

    assert_eq!(failure.stage, PipelineStage::Validating);
    assert_eq!(failure.kind(), ErrorKind::ValidationFailed);
    assert_eq!(
        failure.error.validation_errors().map(<[String]>::to_vec),
        Some(vec![
            "Please provide at least one emotion.".to_string(),
            "Please provide at least one goal.".to_string(),
        ])
    );
    assert_eq!(script.calls(), 0);
    assert_eq!(audio.calls(), 0);
    assert!(store.list_recent(10).expect("list").is_empty());
}

#[tokio::test]
async fn malformed_selection_is_input_format() {
    let temp = tempdir().expect("tempdir");
    let orchestrator = PipelineOrchestrator::new(
        &LimitsConfig::default(),
        Arc::new(FixedScriptGenerator::new("unused")),
        Arc::new(RecordingAudioGenerator::new(storage(temp.path()))),
        Arc::new(SqliteMeditationStore::open_in_memory().expect("store")),
    );
    let mut input = request(&["Calm"], &["Focus"], &["Peace"]);
    input.goals = json!([{ "name": "Focus" }]);

    let failure = orchestrator.generate(&input).await.expect_err("malformed");
    assert_eq!(failure.kind(), ErrorKind::InputFormat);
}

/// Credential rejection on the text stage performs no audio call and no insert.
#[tokio::test]
async fn script_credential_rejection_stops_pipeline() {
    let temp = tempdir().expect("tempdir");
    let script = FailingScriptGenerator::new(MeditationError::Configuration(
        "The script generation service rejected the configured API key.".to_string(),
    ));
    let audio = RecordingAudioGenerator::new(storage(temp.path()));
    let store = Arc::new(SqliteMeditationStore::open_in_memory().expect("store"));
    let orchestrator = PipelineOrchestrator::new(
        &LimitsConfig::default(),
        Arc::new(script.clone()),
        Arc::new(audio.clone()),
        store.clone(),
    );

    let failure = orchestrator
        .generate(&request(&["Calm"], &["Relaxation"], &["Feeling Calm"]))
        .await
        .expect_err("rejected");

    assert_eq!(failure.stage, PipelineStage::ScriptGenerating);
    assert_eq!(failure.kind(), ErrorKind::ConfigurationError);
    assert_eq!(script.calls(), 1);
    assert_eq!(audio.calls(), 0);
    assert!(store.list_recent(10).expect("list").is_empty());
}

/// Rate limiting on the audio stage persists nothing.
#[tokio::test]
async fn audio_rate_limit_persists_nothing() {
    let temp = tempdir().expect("tempdir");
    let audio = FailingAudioGenerator::new(MeditationError::ProviderOverloaded(
        "The audio generation service is currently busy. Please try again later.".to_string(),
    ));
    let store = Arc::new(SqliteMeditationStore::open_in_memory().expect("store"));
    let orchestrator = PipelineOrchestrator::new(
        &LimitsConfig::default(),
        Arc::new(FixedScriptGenerator::new(script_with_words(50))),
        Arc::new(audio.clone()),
        store.clone(),
    );

    let failure = orchestrator
        .generate(&request(&["Calm"], &["Relaxation"], &["Feeling Calm"]))
        .await
        .expect_err("overloaded");

    assert_eq!(failure.stage, PipelineStage::AudioGenerating);
    assert_eq!(failure.kind(), ErrorKind::ProviderOverloaded);
    assert_eq!(audio.calls(), 1);
    assert!(store.list_recent(10).expect("list").is_empty());
    assert_eq!(file_count(temp.path()), 0);
}

/// A persistence failure is unexpected and removes the audio already written.
#[tokio::test]
async fn persistence_failure_discards_audio() {
    let temp = tempdir().expect("tempdir");
    let audio_root = temp.path().join("audio");
    let audio = RecordingAudioGenerator::new(storage(&audio_root));
    let store = FailingStore::new();
    let orchestrator = PipelineOrchestrator::new(
        &LimitsConfig::default(),
        Arc::new(FixedScriptGenerator::new(script_with_words(20))),
        Arc::new(audio.clone()),
        Arc::new(store.clone()),
    );

    let failure = orchestrator
        .generate(&request(&["Calm"], &["Relaxation"], &["Feeling Calm"]))
        .await
        .expect_err("store failure");

    assert_eq!(failure.stage, PipelineStage::Persisting);
    assert_eq!(failure.kind(), ErrorKind::UnexpectedError);
    assert!(!failure.error.to_string().contains("disk full"));
    assert_eq!(store.inserts(), 1);
    assert_eq!(audio.discarded().len(), 1);
    assert_eq!(file_count(&audio_root), 0);
}
