//! Database access for myagara-ic

pub mod records;

pub use records::{RecordStore, SqliteRecordStore};
