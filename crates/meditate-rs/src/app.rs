use log::info;
use meditate_rs_config::{ConfigError, Credentials, MeditateConfig};
use meditate_rs_core::{
    AudioStorage, ElevenLabsAudioClient, MeditationError, OpenAiScriptClient,
    PipelineOrchestrator, SqliteMeditationStore, StoreError,
};
use meditate_rs_server::AppState;
use std::sync::Arc;
use thiserror::Error;

/// Failures assembling the service from its configuration.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("provider client error: {0}")]
    Client(#[from] MeditationError),
    #[error("unsupported database url: {0}")]
    UnsupportedDatabase(String),
    #[error("failed to prepare audio directory: {0}")]
    AudioDir(#[source] std::io::Error),
}

/// Open the configured meditation database, creating it if absent.
pub fn open_store(config: &MeditateConfig) -> Result<SqliteMeditationStore, AppError> {
    let location = config
        .database_location()
        .ok_or_else(|| AppError::UnsupportedDatabase(config.storage.database_url.clone()))?;
    Ok(SqliteMeditationStore::open(&location)?)
}

/// Build the provider clients, store, and pipeline behind the HTTP routes.
pub fn build_state(
    config: &MeditateConfig,
    credentials: Credentials,
) -> Result<AppState, AppError> {
    let store = Arc::new(open_store(config)?);
    let storage = AudioStorage::from_config(&config.audio, &config.server);
    std::fs::create_dir_all(storage.root()).map_err(AppError::AudioDir)?;

    let script = OpenAiScriptClient::new(&config.script, credentials.text_api_key)?;
    let audio =
        ElevenLabsAudioClient::new(&config.audio, credentials.voice_api_key, storage.clone())?;
    let orchestrator = PipelineOrchestrator::new(
        &config.limits,
        Arc::new(script),
        Arc::new(audio),
        store,
    );
    info!(
        "service assembled (model={}, voice_id={}, audio_dir={})",
        config.script.model,
        config.audio.voice_id,
        storage.root().display()
    );
    Ok(AppState::new(
        Arc::new(orchestrator),
        config.server.audio_route.clone(),
        storage.root(),
    ))
}

#[cfg(test)]
mod tests {
    use super::{AppError, build_state, open_store};
    use meditate_rs_config::{AudioConfig, Credentials, MeditateConfig, StorageConfig};
    use meditate_rs_core::{MeditationError, MeditationStore};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> MeditateConfig {
        MeditateConfig::builder()
            .audio(AudioConfig {
                storage_dir: dir.join("audio"),
                ..AudioConfig::default()
            })
            .storage(StorageConfig {
                database_url: format!("sqlite://{}", dir.join("meditations.db").display()),
            })
            .build()
    }

    #[test]
    fn builds_state_without_contacting_providers() {
        let temp = tempdir().expect("tempdir");
        let config = config_in(temp.path());
        let state = build_state(&config, Credentials::new("sk-test", "xi-test")).expect("state");
        assert_eq!(state.audio_route(), "/static/audio");
        assert!(temp.path().join("audio").is_dir());
        assert!(temp.path().join("meditations.db").exists());
    }

    #[test]
    fn blank_voice_credential_fails_assembly() {
        let temp = tempdir().expect("tempdir");
        let err = build_state(&config_in(temp.path()), Credentials::new("sk-test", " "))
            .err()
            .expect("blank key");
        assert!(matches!(err, AppError::Client(MeditationError::Configuration(_))));
    }

    #[test]
    fn open_store_reuses_existing_database() {
        let temp = tempdir().expect("tempdir");
        let config = config_in(temp.path());
        open_store(&config)
            .expect("first open")
            .reset()
            .expect("reset");
        let store = open_store(&config).expect("second open");
        assert!(store.list_recent(5).expect("list").is_empty());
    }

    #[test]
    fn unsupported_database_is_rejected() {
        let config = MeditateConfig::builder()
            .storage(StorageConfig {
                database_url: "postgres://db/meditations".to_string(),
            })
            .build();
        let err = open_store(&config).err().expect("unsupported");
        assert!(matches!(err, AppError::UnsupportedDatabase(_)));
    }
}
