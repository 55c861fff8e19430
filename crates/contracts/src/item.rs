//! LogItem - the unit submitted to and returned by the logging service

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque item payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPayload {
    /// Structured JSON document
    Json(serde_json::Value),
    /// Raw bytes (encoded by the producer)
    Blob(Bytes),
}

impl Default for LogPayload {
    fn default() -> Self {
        Self::Json(serde_json::Value::Null)
    }
}

/// A single structured log item.
///
/// Immutable once submitted: the client takes ownership for the duration of a
/// call and never modifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogItem {
    /// Grouping identifier (e.g. a subsystem name); must be non-empty
    pub event_source: String,

    /// Acquisition time of the item
    pub acquisition_time: DateTime<Utc>,

    /// Opaque payload
    #[serde(default)]
    pub payload: LogPayload,
}

impl LogItem {
    /// Create an item stamped with the current time
    pub fn new(event_source: impl Into<String>, payload: LogPayload) -> Self {
        Self {
            event_source: event_source.into(),
            acquisition_time: Utc::now(),
            payload,
        }
    }

    /// Create a JSON item stamped with the current time
    pub fn json(event_source: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(event_source, LogPayload::Json(value))
    }

    pub fn with_acquisition_time(mut self, acquisition_time: DateTime<Utc>) -> Self {
        self.acquisition_time = acquisition_time;
        self
    }
}
