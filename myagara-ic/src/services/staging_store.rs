//! Staging store for uploaded images
//!
//! Uploaded bytes are written under a base directory so the classifier
//! client can send them by path. Staged files are never removed here.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Staging failures
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("No file supplied")]
    NoFile,

    #[error("Failed to create staging directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write staged file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes uploads into a single base directory
#[derive(Debug, Clone)]
pub struct StagingStore {
    base_dir: PathBuf,
}

impl StagingStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Persist `bytes` and return the staged path
    ///
    /// The staged name is `<uuid>-<last component of original_filename>`.
    /// The base directory is created on demand.
    pub async fn save(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<PathBuf, StagingError> {
        let name = sanitize_filename(original_filename).ok_or(StagingError::NoFile)?;

        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|source| StagingError::CreateDir {
                path: self.base_dir.clone(),
                source,
            })?;

        let path = self
            .base_dir
            .join(format!("{}-{}", myagara_common::uuid_utils::generate_id(), name));

        let write = async {
            let mut file = tokio::fs::File::create(&path).await?;
            file.write_all(bytes).await?;
            file.flush().await
        };
        write.await.map_err(|source| StagingError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Staged upload");
        Ok(path)
    }
}

/// Last path component of a client-supplied name, or None if nothing usable is left
fn sanitize_filename(original: &str) -> Option<&str> {
    let name = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    match name {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}
