//! LogOptions - per-source logging configuration
//!
//! Persisted server-side, referenced but never cached by the client.
//! Last write wins; there is no versioning.

use serde::{Deserialize, Serialize};

/// Per event_source logging policy
///
/// Unset fields leave the server default in effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogOptions {
    /// Whether buffered items are synced to storage at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_active: Option<bool>,

    /// Buffer size (bytes) that triggers a flush
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_buffer_byte_size: Option<u64>,

    /// Keep rotated segments on local disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain_on_disk: Option<bool>,

    /// Keep rotated segments only if `priority` qualifies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain_on_disk_based_on_priority: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Upper bound on accepted items per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_hz: Option<f64>,
}
