//! Upload-classify-persist pipeline
//!
//! Upload stages, in order, terminating on the first failure:
//! received -> staged -> classified -> assembled -> persisted.
//!
//! Nothing is rolled back. A failed classification leaves the staged file
//! on disk, and a failed save loses the classification result.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::RecordStore;
use crate::models::{Record, RecordPatch};
use crate::services::classifier_client::{ClassificationError, ImageClassifier};
use crate::services::staging_store::{StagingError, StagingStore};

/// Failures surfaced by `UploadOrchestrator`
#[derive(Debug, Error)]
pub enum ImageServiceError {
    #[error("Staging failed: {0}")]
    Staging(#[from] StagingError),

    #[error("Classification failed: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] myagara_common::Error),

    #[error("Image not found with ID: {0}")]
    NotFound(String),
}

pub type ImageServiceResult<T> = Result<T, ImageServiceError>;

/// Coordinates staging, classification and record storage
pub struct UploadOrchestrator {
    staging: StagingStore,
    classifier: Arc<dyn ImageClassifier>,
    records: Arc<dyn RecordStore>,
}

impl UploadOrchestrator {
    pub fn new(
        staging: StagingStore,
        classifier: Arc<dyn ImageClassifier>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            staging,
            classifier,
            records,
        }
    }

    /// Stage, classify and persist one uploaded image
    pub async fn upload(&self, bytes: &[u8], filename: &str) -> ImageServiceResult<Record> {
        debug!(filename = %filename, bytes = bytes.len(), "Upload received");

        let staged_path = self.staging.save(bytes, filename).await.map_err(|e| {
            warn!(filename = %filename, error = %e, "Staging failed");
            e
        })?;
        debug!(path = %staged_path.display(), "Upload staged");

        let classification = self.classifier.classify(&staged_path).await.map_err(|e| {
            warn!(
                filename = %filename,
                path = %staged_path.display(),
                error = %e,
                "Classification failed"
            );
            e
        })?;
        debug!(label = %classification.label, "Upload classified");

        let record = Record {
            id: myagara_common::uuid_utils::generate_id(),
            filename: filename.to_string(),
            timestamp: myagara_common::time::now_millis(),
            label: classification.label,
            confidence: classification.confidence,
        };

        let saved = self.records.save(&record).await.map_err(|e| {
            warn!(record_id = %record.id, error = %e, "Persisting classified image failed");
            e
        })?;

        info!(
            record_id = %saved.id,
            filename = %saved.filename,
            label = %saved.label,
            confidence = saved.confidence,
            "Image classified and stored"
        );

        Ok(saved)
    }

    pub async fn get_all(&self) -> ImageServiceResult<Vec<Record>> {
        Ok(self.records.find_all().await?)
    }

    pub async fn get_by_id(&self, id: &str) -> ImageServiceResult<Record> {
        self.records
            .find_by_id(id)
            .await?
            .ok_or_else(|| ImageServiceError::NotFound(id.to_string()))
    }

    /// Merge `patch` into an existing record and save it
    ///
    /// See `RecordPatch` for which values count as supplied.
    pub async fn update_metadata(&self, id: &str, patch: RecordPatch) -> ImageServiceResult<Record> {
        let mut record = self.get_by_id(id).await?;

        if patch.is_empty() {
            debug!(record_id = %id, "Update carries no applicable fields");
        }
        patch.apply_to(&mut record);

        let saved = self.records.save(&record).await?;
        info!(record_id = %id, "Image metadata updated");
        Ok(saved)
    }

    pub async fn delete_by_id(&self, id: &str) -> ImageServiceResult<()> {
        if !self.records.exists_by_id(id).await? {
            return Err(ImageServiceError::NotFound(id.to_string()));
        }

        self.records.delete_by_id(id).await?;
        info!(record_id = %id, "Image deleted");
        Ok(())
    }

    pub async fn delete_all(&self) -> ImageServiceResult<()> {
        self.records.delete_all().await?;
        info!("All images deleted");
        Ok(())
    }
}
