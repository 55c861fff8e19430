//! Query and wire records
//!
//! Request/response shapes of the logging service, independent of any wire
//! format. The client mirrors these one-to-one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{LogItem, LogOptions};

/// Page size used when none is given: "everything in one page" unless the
/// server caps it.
pub const DEFAULT_PAGE_SIZE: u32 = i32::MAX as u32;

/// Half-open time window `[start, end)`; `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Window unbounded on both ends
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn until(end: DateTime<Utc>) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| t >= s) && self.end.is_none_or(|e| t < e)
    }

    /// A window whose start is after its end can never match anything
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }
}

// ===== Wire records =====

/// `Log` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRequest {
    pub item: LogItem,
}

/// `GetLogItems` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetLogItemsRequest {
    pub event_sources: Vec<String>,
    #[serde(default)]
    pub window: TimeWindow,
    pub max_num_items: u32,
    /// Server-issued cursor; `None` requests the first page
    #[serde(default)]
    pub cursor: Option<String>,
}

/// `GetLogItems` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetLogItemsResponse {
    pub log_items: Vec<LogItem>,
    /// Empty when there are no further pages
    #[serde(default)]
    pub cursor: String,
}

/// `SyncAndRotateLogs` request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub event_sources: Vec<String>,
    #[serde(default)]
    pub sync_all: bool,
}

/// `SyncAndRotateLogs` response: sources for which a rotation happened
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub event_sources: Vec<String>,
}

/// `SetLogOptions` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLogOptionsRequest {
    pub event_source: String,
    pub log_options: LogOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_window_is_half_open() {
        let window = TimeWindow::between(t(10), t(20));
        assert!(!window.contains(t(9)));
        assert!(window.contains(t(10)));
        assert!(window.contains(t(19)));
        assert!(!window.contains(t(20)));
    }

    #[test]
    fn test_unbounded_window_contains_everything() {
        let window = TimeWindow::unbounded();
        assert!(window.contains(t(0)));
        assert!(window.contains(t(i32::MAX as i64)));
        assert!(TimeWindow::since(t(5)).contains(t(100)));
        assert!(!TimeWindow::until(t(5)).contains(t(5)));
    }

    #[test]
    fn test_inverted_window() {
        assert!(TimeWindow::between(t(20), t(10)).is_inverted());
        assert!(!TimeWindow::between(t(10), t(10)).is_inverted());
        assert!(!TimeWindow::since(t(10)).is_inverted());
    }
}
