//! Data models for myagara-ic

pub mod record;

pub use record::{Classification, Record, RecordPatch, UNKNOWN_LABEL};
