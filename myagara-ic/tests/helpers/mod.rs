//! Test helper utilities
//!
//! Shared by the myagara-ic integration tests. Not every test binary uses
//! every helper.

#![allow(dead_code)]

pub mod fake_classifier;

pub use fake_classifier::{FakeClassifier, FakeResponse, ReceivedImage};

use async_trait::async_trait;
use myagara_ic::db::{RecordStore, SqliteRecordStore};
use myagara_ic::models::{Classification, Record};
use myagara_ic::services::{ClassificationError, ImageClassifier, StagingStore, UploadOrchestrator};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "myagara-test-boundary";

/// Record store on a private in-memory SQLite database
pub async fn memory_store() -> Arc<SqliteRecordStore> {
    let pool = myagara_common::db::init_memory_database().await.unwrap();
    Arc::new(SqliteRecordStore::new(pool))
}

pub fn orchestrator(
    staging_dir: &Path,
    classifier: Arc<dyn ImageClassifier>,
    records: Arc<dyn RecordStore>,
) -> UploadOrchestrator {
    UploadOrchestrator::new(StagingStore::new(staging_dir), classifier, records)
}

/// Files currently in a staging directory
pub fn staged_files(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

pub fn sample_record(id: &str) -> Record {
    Record {
        id: id.to_string(),
        filename: format!("{}.jpg", id),
        timestamp: 1_700_000_000_000,
        label: "Potato___healthy".to_string(),
        confidence: 91.0,
    }
}

/// Outcome a `StubClassifier` returns on every call
#[derive(Debug, Clone)]
pub enum StubOutcome {
    Classified(Classification),
    Status(u16),
    Malformed,
}

/// In-memory classifier; records the paths it was asked about
pub struct StubClassifier {
    outcome: StubOutcome,
    calls: AtomicUsize,
    paths: Mutex<Vec<PathBuf>>,
}

impl StubClassifier {
    pub fn new(outcome: StubOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            paths: Mutex::new(Vec::new()),
        })
    }

    pub fn labelled(label: &str, confidence: f64) -> Arc<Self> {
        Self::new(StubOutcome::Classified(Classification {
            label: label.to_string(),
            confidence,
        }))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageClassifier for StubClassifier {
    async fn classify(&self, file_path: &Path) -> Result<Classification, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(file_path.to_path_buf());

        match &self.outcome {
            StubOutcome::Classified(c) => Ok(c.clone()),
            StubOutcome::Status(status) => Err(ClassificationError::Status(*status)),
            StubOutcome::Malformed => Err(ClassificationError::MalformedField {
                field: "confidence",
                reason: "'high' is not a number".to_string(),
            }),
        }
    }
}

/// Record store whose every operation fails
pub struct FailingRecordStore;

fn offline() -> myagara_common::Error {
    myagara_common::Error::Config("record store offline".to_string())
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn find_by_id(&self, _id: &str) -> myagara_common::Result<Option<Record>> {
        Err(offline())
    }

    async fn find_all(&self) -> myagara_common::Result<Vec<Record>> {
        Err(offline())
    }

    async fn save(&self, _record: &Record) -> myagara_common::Result<Record> {
        Err(offline())
    }

    async fn exists_by_id(&self, _id: &str) -> myagara_common::Result<bool> {
        Err(offline())
    }

    async fn delete_by_id(&self, _id: &str) -> myagara_common::Result<()> {
        Err(offline())
    }

    async fn delete_all(&self) -> myagara_common::Result<()> {
        Err(offline())
    }
}

/// Single-part multipart/form-data body
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
