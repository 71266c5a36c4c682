//! Unguessable on-disk storage for synthesized audio.

use crate::error::MeditationError;
use log::{debug, error};
use meditate_rs_config::{AudioConfig, ServerConfig};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Random bytes behind each file name (hex-encoded to twice this length).
const FILE_NAME_BYTES: usize = 16;

/// A persisted audio file and the reference used to serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub file_name: String,
    pub path: PathBuf,
    /// Reference handed back to callers, e.g. `/static/audio/<file>`.
    pub url: String,
}

/// Directory of audio files served under a fixed URL prefix.
#[derive(Debug, Clone)]
pub struct AudioStorage {
    root: PathBuf,
    route: String,
    extension: String,
}

impl AudioStorage {
    pub fn new(
        root: impl AsRef<Path>,
        route: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        let route: String = route.into();
        Self {
            root: root.as_ref().to_path_buf(),
            route: route.trim_end_matches('/').to_string(),
            extension: extension.into(),
        }
    }

    pub fn from_config(audio: &AudioConfig, server: &ServerConfig) -> Self {
        Self::new(
            &audio.storage_dir,
            server.audio_route.clone(),
            audio.file_extension.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the payload under a fresh random name.
    ///
    /// The bytes land in a temporary sibling first and are renamed into place,
    /// so a failed write never leaves a visible partial file.
    pub fn persist(&self, bytes: &[u8]) -> Result<AudioClip, MeditationError> {
        fs::create_dir_all(&self.root).map_err(|err| storage_error(&self.root, err))?;
        let file_name = self.fresh_file_name();
        let path = self.root.join(&file_name);
        let temp_path = self.root.join(format!(".{file_name}.tmp"));

        let written = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp_path, &path));
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(storage_error(&path, err));
        }

        debug!(
            "persisted audio clip (file={}, bytes={})",
            file_name,
            bytes.len()
        );
        Ok(AudioClip {
            url: format!("{}/{}", self.route, file_name),
            file_name,
            path,
        })
    }

    fn fresh_file_name(&self) -> String {
        let bytes: [u8; FILE_NAME_BYTES] = rand::random();
        format!("meditation_{}.{}", hex::encode(bytes), self.extension)
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> MeditationError {
    error!(
        "failed to persist audio (path={}, err={})",
        path.display(),
        err
    );
    MeditationError::Unexpected("Failed to store the generated audio.".to_string())
}
