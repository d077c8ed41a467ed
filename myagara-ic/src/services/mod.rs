//! Image ingestion services

pub mod classifier_client;
pub mod staging_store;
pub mod upload_orchestrator;

pub use classifier_client::{
    parse_classification, ClassificationError, HttpClassifierClient, ImageClassifier,
};
pub use staging_store::{StagingError, StagingStore};
pub use upload_orchestrator::{ImageServiceError, ImageServiceResult, UploadOrchestrator};
