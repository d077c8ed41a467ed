//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as milliseconds since the Unix epoch
///
/// This is the unit stored in `Record::timestamp`.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
