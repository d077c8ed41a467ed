//! Classified image record
//!
//! One `Record` per successful upload. The JSON shape is the public wire
//! format of `/api/images`.

use serde::{Deserialize, Serialize};

/// Label stored when the classifier response carries none
pub const UNKNOWN_LABEL: &str = "unknown";

/// Persisted classification of one uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque identifier assigned at creation, never changed afterwards
    pub id: String,
    /// Original name supplied by the uploader (informational only)
    pub filename: String,
    /// Creation time, milliseconds since the Unix epoch
    pub timestamp: i64,
    pub label: String,
    /// Classifier score in the classifier's own scale
    pub confidence: f64,
}

/// Label and confidence returned by the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            confidence: 0.0,
        }
    }
}

/// Partial record accepted by `PUT /api/images/{id}`
///
/// Every field is optional. A field is applied only when it is present and
/// non-empty / non-zero: an empty `filename` or `label`, a `timestamp` of 0
/// and a `confidence` of 0.0 all count as "not supplied". A caller therefore
/// cannot reset `confidence` or `timestamp` to zero through an update.
///
/// Unknown keys (including `id`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordPatch {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl RecordPatch {
    /// Merge the supplied fields into `record`, leaving `id` untouched
    pub fn apply_to(self, record: &mut Record) {
        if let Some(filename) = self.filename.filter(|f| !f.is_empty()) {
            record.filename = filename;
        }
        if let Some(timestamp) = self.timestamp.filter(|t| *t != 0) {
            record.timestamp = timestamp;
        }
        if let Some(label) = self.label.filter(|l| !l.is_empty()) {
            record.label = label;
        }
        if let Some(confidence) = self.confidence.filter(|c| *c != 0.0) {
            record.confidence = confidence;
        }
    }

    /// True when applying this patch cannot change anything
    pub fn is_empty(&self) -> bool {
        self.filename.as_deref().map_or(true, str::is_empty)
            && self.timestamp.map_or(true, |t| t == 0)
            && self.label.as_deref().map_or(true, str::is_empty)
            && self.confidence.map_or(true, |c| c == 0.0)
    }
}
