//! Row codecs for the session table.
//!
//! String lists persist as JSON-encoded TEXT columns and timestamps as
//! ISO-8601 local date-time text. Both round-trip exactly: encoding an
//! ordered list and decoding it back yields the same list, and
//! NULL/absent maps to `None` in both directions.

use chrono::NaiveDateTime;

use crate::store::{Result, StoreError};

/// Timestamp column format. Lexicographic order on this text equals
/// chronological order, which the recency index relies on.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Encode an optional string list as a JSON TEXT column value.
pub fn encode_string_list(list: Option<&[String]>) -> Result<Option<String>> {
    match list {
        Some(items) => Ok(Some(serde_json::to_string(items)?)),
        None => Ok(None),
    }
}

/// Decode a JSON TEXT column value back into a string list.
pub fn decode_string_list(value: Option<&str>) -> Result<Option<Vec<String>>> {
    match value {
        Some(json) => Ok(Some(serde_json::from_str(json)?)),
        None => Ok(None),
    }
}

/// Format a timestamp for storage.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{}': {}", s, e)))
}
