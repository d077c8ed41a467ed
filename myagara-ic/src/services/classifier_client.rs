//! Remote image classifier client
//!
//! POSTs a staged image as multipart field `image` and reads back
//! `{"label": string, "confidence": number}`. Both keys are optional in the
//! response; a missing label becomes `"unknown"` and a missing confidence
//! becomes `0.0`. One attempt per call, no retries.

use async_trait::async_trait;
use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Classification, UNKNOWN_LABEL};

const USER_AGENT: &str = concat!("myagara-ic/", env!("CARGO_PKG_VERSION"));

/// Multipart field the classifier reads the image from
pub const IMAGE_FIELD: &str = "image";

/// Classification failures
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// Rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Classifier request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Classifier returned HTTP {0}")]
    Status(u16),

    #[error("Classifier returned an unreadable body: {0}")]
    EmptyBody(String),

    #[error("Classifier field '{field}' is malformed: {reason}")]
    MalformedField { field: &'static str, reason: String },
}

/// Anything that can turn a staged image into a label and confidence
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify(&self, file_path: &Path) -> Result<Classification, ClassificationError>;
}

/// HTTP client for the classifier service
pub struct HttpClassifierClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifierClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClassificationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(ClassificationError::Transport)?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageClassifier for HttpClassifierClient {
    async fn classify(&self, file_path: &Path) -> Result<Classification, ClassificationError> {
        if file_path.as_os_str().is_empty() {
            return Err(ClassificationError::InvalidInput(
                "no file path supplied".to_string(),
            ));
        }

        let metadata = tokio::fs::metadata(file_path).await.map_err(|e| {
            ClassificationError::InvalidInput(format!("{}: {}", file_path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(ClassificationError::InvalidInput(format!(
                "{} is not a regular file",
                file_path.display()
            )));
        }

        let bytes = tokio::fs::read(file_path).await.map_err(|e| {
            ClassificationError::InvalidInput(format!("{}: {}", file_path.display(), e))
        })?;

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| IMAGE_FIELD.to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part(IMAGE_FIELD, part);

        tracing::debug!(
            endpoint = %self.endpoint,
            path = %file_path.display(),
            "Sending image to classifier"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(ClassificationError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Classifier rejected request");
            return Err(ClassificationError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClassificationError::EmptyBody(e.to_string()))?;

        let classification = parse_classification(&body)?;

        tracing::debug!(
            label = %classification.label,
            confidence = classification.confidence,
            "Classifier response parsed"
        );

        Ok(classification)
    }
}

/// Parse a classifier response body
///
/// An empty, non-JSON, `null` or non-object body is `EmptyBody`. A `label`
/// that is not a string, or a `confidence` that is neither a number nor a
/// numeric string, is `MalformedField`.
pub fn parse_classification(body: &[u8]) -> Result<Classification, ClassificationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ClassificationError::EmptyBody("no content".to_string()));
    }

    // Only the outer shape is checked here; each field is parsed on its own
    // so an out-of-range number is reported against that field.
    let raw: &RawValue = serde_json::from_slice(body)
        .map_err(|e| ClassificationError::EmptyBody(format!("not JSON: {}", e)))?;
    let text = raw.get().trim_start();

    match text.as_bytes().first() {
        Some(b'{') => {}
        Some(b'n') => return Err(ClassificationError::EmptyBody("null body".to_string())),
        first => {
            return Err(ClassificationError::EmptyBody(format!(
                "expected a JSON object, got {}",
                raw_kind(first)
            )))
        }
    }

    let fields: HashMap<String, &RawValue> = serde_json::from_str(text)
        .map_err(|e| ClassificationError::EmptyBody(format!("not a JSON object: {}", e)))?;

    let field = |name: &'static str| -> Result<Option<Value>, ClassificationError> {
        fields
            .get(name)
            .map(|raw| {
                serde_json::from_str::<Value>(raw.get()).map_err(|e| {
                    ClassificationError::MalformedField {
                        field: name,
                        reason: e.to_string(),
                    }
                })
            })
            .transpose()
    };

    let label = match field("label")? {
        None => UNKNOWN_LABEL.to_string(),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(ClassificationError::MalformedField {
                field: "label",
                reason: format!("expected a string, got {}", json_kind(&other)),
            })
        }
    };

    let confidence = match field("confidence")? {
        None => 0.0,
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| ClassificationError::MalformedField {
            field: "confidence",
            reason: format!("{} is not representable as f64", n),
        })?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ClassificationError::MalformedField {
                field: "confidence",
                reason: format!("'{}' is not a number", s),
            })?,
        Some(other) => {
            return Err(ClassificationError::MalformedField {
                field: "confidence",
                reason: format!("expected a number, got {}", json_kind(&other)),
            })
        }
    };

    Ok(Classification { label, confidence })
}

fn raw_kind(first: Option<&u8>) -> &'static str {
    match first {
        Some(b'[') => "array",
        Some(b'"') => "string",
        Some(b't') | Some(b'f') => "boolean",
        _ => "number",
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
