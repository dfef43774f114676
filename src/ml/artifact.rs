//! On-disk format for fitted vectorizer and classifier state.
//!
//! Each artifact is a bincode-encoded [`ArtifactEnvelope`] wrapping the
//! bincode payload of the fitted object. Loading checks the magic bytes,
//! format version, artifact kind and SHA-256 checksum before decoding the
//! payload. Writes go to a sibling temp file that is renamed into place, so a
//! failed save never leaves a truncated artifact behind.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Leading bytes of every artifact
pub const ARTIFACT_MAGIC: [u8; 4] = *b"ICAF";

/// Bumped whenever the payload layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 2;

/// File name of the vectorizer artifact inside an artifact directory
pub const VECTORIZER_FILE: &str = "vectorizer.bin";

/// File name of the classifier artifact inside an artifact directory
pub const CLASSIFIER_FILE: &str = "intent_model.bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Vectorizer,
    Classifier,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Vectorizer => write!(f, "vectorizer"),
            ArtifactKind::Classifier => write!(f, "classifier"),
        }
    }
}

/// Versioned, checksummed wrapper around a serialized model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope {
    pub magic: [u8; 4],
    pub format_version: u32,
    pub kind: ArtifactKind,
    /// Version of the crate that wrote the artifact
    pub crate_version: String,
    pub created_at: DateTime<Utc>,
    /// Hex SHA-256 of `payload`
    pub checksum: String,
    pub payload: Vec<u8>,
}

impl ArtifactEnvelope {
    /// Wrap a fitted object
    pub fn seal<T: Serialize>(kind: ArtifactKind, state: &T) -> Result<Self> {
        let payload = bincode::serialize(state).map_err(|e| {
            AppError::Artifact(format!("Failed to serialize {}: {}", kind, e))
        })?;

        Ok(Self {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            kind,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            checksum: checksum(&payload),
            payload,
        })
    }

    /// Validate the header and checksum, then decode the payload
    pub fn open<T: DeserializeOwned>(&self, expected: ArtifactKind) -> Result<T> {
        if self.magic != ARTIFACT_MAGIC {
            return Err(AppError::Artifact(
                "Not an intent-classifier artifact (bad magic bytes)".to_string(),
            ));
        }
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(AppError::Artifact(format!(
                "Unsupported artifact format version {} (expected {}, written by {})",
                self.format_version, ARTIFACT_FORMAT_VERSION, self.crate_version
            )));
        }
        if self.kind != expected {
            return Err(AppError::Artifact(format!(
                "Expected a {} artifact, found a {} artifact",
                expected, self.kind
            )));
        }
        if checksum(&self.payload) != self.checksum {
            return Err(AppError::Artifact(format!(
                "Checksum mismatch for {} artifact",
                self.kind
            )));
        }

        bincode::deserialize(&self.payload).map_err(|e| {
            AppError::Artifact(format!("Failed to deserialize {}: {}", self.kind, e))
        })
    }
}

/// Locations of the two artifacts produced by training
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vectorizer: dir.join(VECTORIZER_FILE),
            classifier: dir.join(CLASSIFIER_FILE),
        }
    }
}

/// Serialize `state` and atomically replace the file at `path`
pub fn save_artifact<T: Serialize>(
    kind: ArtifactKind,
    state: &T,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let envelope = ArtifactEnvelope::seal(kind, state)?;
    let bytes = bincode::serialize(&envelope)
        .map_err(|e| AppError::Artifact(format!("Failed to encode {}: {}", kind, e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    if let Err(e) = write_then_rename(&tmp_path, path, &bytes) {
        // The temp file may never have been created
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    info!(
        kind = %kind,
        path = %path.display(),
        bytes = bytes.len(),
        checksum = %envelope.checksum,
        "Saved artifact"
    );

    Ok(())
}

/// Read the envelope at `path` without decoding the payload
pub fn read_envelope(path: impl AsRef<Path>) -> Result<ArtifactEnvelope> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        AppError::Artifact(format!("Failed to read {}: {}", path.display(), e))
    })?;

    bincode::deserialize(&bytes).map_err(|e| {
        AppError::Artifact(format!("Corrupt artifact {}: {}", path.display(), e))
    })
}

/// Load and verify an artifact of the given kind
pub fn load_artifact<T: DeserializeOwned>(kind: ArtifactKind, path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let envelope = read_envelope(path)?;
    let state = envelope.open(kind)?;

    info!(
        kind = %kind,
        path = %path.display(),
        written_by = %envelope.crate_version,
        created_at = %envelope.created_at,
        "Loaded artifact"
    );

    Ok(state)
}

fn write_then_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp_path, path)
}

fn checksum(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    format!("{:x}", hasher.finalize())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}
