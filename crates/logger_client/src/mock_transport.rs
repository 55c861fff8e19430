//! In-memory logging service
//!
//! A `LoggerTransport` that simulates the service in-process, for unit and
//! integration tests. Supports injected latency and failures, and records
//! call counts and peak concurrency.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use contracts::{
    GetLogItemsRequest, GetLogItemsResponse, LogItem, LogOptions, LogRequest, LoggerTransport,
    LoggingError, Result, SetLogOptionsRequest, SyncRequest, SyncResponse,
};
use tracing::{instrument, trace};

/// How long most-recent items stay answerable by default
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(600);

/// Mock service configuration (failure injection)
#[derive(Debug, Clone)]
pub struct MockLoggerConfig {
    /// Most-recent cache lifetime
    pub retention: Duration,
    /// Server-side cap on items per page
    pub max_page_size: Option<u32>,
    /// Delay applied to every call
    pub latency: Option<Duration>,
    /// `log` fails with `Unavailable` for these sources
    pub fail_sources: Vec<String>,
    /// Every call fails with `Unavailable`
    pub fail_all: bool,
}

impl Default for MockLoggerConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            max_page_size: None,
            latency: None,
            fail_sources: Vec::new(),
            fail_all: false,
        }
    }
}

struct StoredItem {
    seq: u64,
    item: LogItem,
}

#[derive(Default)]
struct State {
    next_seq: u64,
    items: Vec<StoredItem>,
    /// Items logged since the last rotation, per source
    pending: HashMap<String, usize>,
    rotations: HashMap<String, u64>,
    recent: HashMap<String, (LogItem, Instant)>,
    options: HashMap<String, LogOptions>,
}

/// In-memory logging service
pub struct InMemoryLogger {
    config: MockLoggerConfig,
    state: Mutex<State>,
    log_calls: AtomicU64,
    total_calls: AtomicU64,
    active: AtomicUsize,
    peak_active: AtomicUsize,
}

/// Marks one call as outstanding for the concurrency statistics
struct ActiveCall<'a> {
    active: &'a AtomicUsize,
}

impl Drop for ActiveCall<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InMemoryLogger {
    pub fn new() -> Self {
        Self::with_config(MockLoggerConfig::default())
    }

    pub fn with_config(config: MockLoggerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State::default()),
            log_calls: AtomicU64::new(0),
            total_calls: AtomicU64::new(0),
            active: AtomicUsize::new(0),
            peak_active: AtomicUsize::new(0),
        }
    }

    /// `log` calls received, successful or not
    pub fn log_calls(&self) -> u64 {
        self.log_calls.load(Ordering::SeqCst)
    }

    /// Calls of any method received
    pub fn total_calls(&self) -> u64 {
        self.total_calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were outstanding at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    /// Stored items across all sources
    pub fn item_count(&self) -> usize {
        self.state().map(|s| s.items.len()).unwrap_or_default()
    }

    /// Rotations performed for `event_source`
    pub fn rotation_count(&self, event_source: &str) -> u64 {
        self.state()
            .ok()
            .and_then(|s| s.rotations.get(event_source).copied())
            .unwrap_or_default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| LoggingError::internal("mock logger state poisoned"))
    }

    /// Common entry of every call: accounting, latency, injected failure
    async fn enter(&self) -> Result<ActiveCall<'_>> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);
        let guard = ActiveCall {
            active: &self.active,
        };

        if let Some(latency) = self.config.latency {
            tokio::time::sleep(latency).await;
        }
        if self.config.fail_all {
            return Err(LoggingError::unavailable("mock logger unavailable"));
        }
        Ok(guard)
    }
}

impl Default for InMemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Server cursor: position of the last returned item in (time, seq) order
fn encode_cursor(item: &StoredItem) -> String {
    format!(
        "{}|{}",
        item.item
            .acquisition_time
            .to_rfc3339_opts(SecondsFormat::Nanos, true),
        item.seq
    )
}

fn decode_cursor(cursor: &str) -> Result<(DateTime<Utc>, u64)> {
    let invalid = || LoggingError::invalid_argument(format!("invalid cursor '{cursor}'"));
    let (time, seq) = cursor.rsplit_once('|').ok_or_else(invalid)?;
    let time = DateTime::parse_from_rfc3339(time)
        .map_err(|_| invalid())?
        .with_timezone(&Utc);
    let seq = seq.parse().map_err(|_| invalid())?;
    Ok((time, seq))
}

fn require_source(event_source: &str) -> Result<()> {
    if event_source.is_empty() {
        return Err(LoggingError::invalid_argument("event_source cannot be empty"));
    }
    Ok(())
}

impl LoggerTransport for InMemoryLogger {
    #[instrument(
        name = "mock_logger_log",
        skip(self, request),
        fields(event_source = %request.item.event_source)
    )]
    async fn log(&self, request: LogRequest) -> Result<()> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        let _active = self.enter().await?;

        let item = request.item;
        require_source(&item.event_source)?;
        if self.config.fail_sources.contains(&item.event_source) {
            return Err(LoggingError::unavailable(format!(
                "mock failure for '{}'",
                item.event_source
            )));
        }

        let mut state = self.state()?;
        let seq = state.next_seq;
        state.next_seq += 1;
        *state.pending.entry(item.event_source.clone()).or_default() += 1;
        state
            .recent
            .insert(item.event_source.clone(), (item.clone(), Instant::now()));
        state.items.push(StoredItem { seq, item });
        trace!(seq, "Item stored");
        Ok(())
    }

    async fn list_log_sources(&self) -> Result<Vec<String>> {
        let _active = self.enter().await?;
        let state = self.state()?;
        let sources: BTreeSet<&str> = state
            .items
            .iter()
            .map(|s| s.item.event_source.as_str())
            .collect();
        Ok(sources.into_iter().map(str::to_string).collect())
    }

    #[instrument(name = "mock_logger_get_log_items", skip(self, request))]
    async fn get_log_items(&self, request: GetLogItemsRequest) -> Result<GetLogItemsResponse> {
        let _active = self.enter().await?;

        if request.event_sources.is_empty() {
            return Err(LoggingError::invalid_argument(
                "at least one event_source is required",
            ));
        }
        for source in &request.event_sources {
            require_source(source)?;
        }
        if request.max_num_items == 0 {
            return Err(LoggingError::invalid_argument("max_num_items must be >= 1"));
        }
        if request.window.is_inverted() {
            return Err(LoggingError::invalid_argument(
                "start_time must not be after end_time",
            ));
        }
        let after = request.cursor.as_deref().map(decode_cursor).transpose()?;

        let state = self.state()?;
        let mut matching: Vec<&StoredItem> = state
            .items
            .iter()
            .filter(|s| request.event_sources.contains(&s.item.event_source))
            .filter(|s| request.window.contains(s.item.acquisition_time))
            .filter(|s| after.is_none_or(|key| (s.item.acquisition_time, s.seq) > key))
            .collect();
        matching.sort_by_key(|s| (s.item.acquisition_time, s.seq));

        let limit = self
            .config
            .max_page_size
            .map_or(request.max_num_items, |cap| cap.clamp(1, request.max_num_items))
            as usize;
        let cursor = if matching.len() > limit {
            encode_cursor(matching[limit - 1])
        } else {
            String::new()
        };
        let log_items = matching
            .into_iter()
            .take(limit)
            .map(|s| s.item.clone())
            .collect();

        Ok(GetLogItemsResponse { log_items, cursor })
    }

    async fn get_most_recent_item(&self, event_source: &str) -> Result<LogItem> {
        let _active = self.enter().await?;
        let state = self.state()?;
        match state.recent.get(event_source) {
            Some((item, logged_at)) if logged_at.elapsed() < self.config.retention => {
                Ok(item.clone())
            }
            _ => Err(LoggingError::not_found(format!(
                "no item logged for '{event_source}' within the retention window"
            ))),
        }
    }

    #[instrument(name = "mock_logger_sync_and_rotate_logs", skip(self))]
    async fn sync_and_rotate_logs(&self, request: SyncRequest) -> Result<SyncResponse> {
        let _active = self.enter().await?;
        let mut state = self.state()?;

        let candidates: Vec<String> = if request.sync_all {
            let all: BTreeSet<String> = state.pending.keys().cloned().collect();
            all.into_iter().collect()
        } else {
            request.event_sources
        };

        let mut event_sources = Vec::new();
        for source in candidates {
            let pending = state.pending.get(&source).copied().unwrap_or_default();
            if pending == 0 {
                continue;
            }
            state.pending.insert(source.clone(), 0);
            *state.rotations.entry(source.clone()).or_default() += 1;
            event_sources.push(source);
        }
        Ok(SyncResponse { event_sources })
    }

    async fn set_log_options(&self, request: SetLogOptionsRequest) -> Result<()> {
        let _active = self.enter().await?;
        require_source(&request.event_source)?;
        self.state()?
            .options
            .insert(request.event_source, request.log_options);
        Ok(())
    }

    async fn get_log_options(&self, event_source: &str) -> Result<LogOptions> {
        let _active = self.enter().await?;
        self.state()?
            .options
            .get(event_source)
            .cloned()
            .ok_or_else(|| LoggingError::not_found(format!("no options set for '{event_source}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::TimeWindow;
    use std::sync::Arc;

    fn request(source: &str) -> LogRequest {
        LogRequest {
            item: LogItem::json(source, serde_json::json!({})),
        }
    }

    #[tokio::test]
    async fn test_retention_expires_most_recent() {
        let logger = InMemoryLogger::with_config(MockLoggerConfig {
            retention: Duration::ZERO,
            ..Default::default()
        });
        logger.log(request("arm1")).await.unwrap();
        let err = logger.get_most_recent_item("arm1").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_cursor() {
        let logger = InMemoryLogger::new();
        let err = logger
            .get_log_items(GetLogItemsRequest {
                event_sources: vec!["arm1".into()],
                window: TimeWindow::unbounded(),
                max_num_items: 10,
                cursor: Some("nope".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LoggingError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_inverted_window_rejected() {
        let logger = InMemoryLogger::new();
        let now = Utc::now();
        let result = logger
            .get_log_items(GetLogItemsRequest {
                event_sources: vec!["arm1".into()],
                window: TimeWindow::between(now, now - chrono::Duration::seconds(1)),
                max_num_items: 10,
                cursor: None,
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fail_all() {
        let logger = InMemoryLogger::with_config(MockLoggerConfig {
            fail_all: true,
            ..Default::default()
        });
        assert!(logger.list_log_sources().await.is_err());
        assert_eq!(logger.total_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_peak_concurrency_tracks_overlap() {
        let logger = Arc::new(InMemoryLogger::with_config(MockLoggerConfig {
            latency: Some(Duration::from_millis(50)),
            ..Default::default()
        }));
        let calls: Vec<_> = (0..8)
            .map(|_| {
                let logger = Arc::clone(&logger);
                tokio::spawn(async move { logger.log(request("arm1")).await })
            })
            .collect();
        for call in calls {
            call.await.unwrap().unwrap();
        }
        assert!(logger.peak_concurrency() > 1);
        assert_eq!(logger.item_count(), 8);
    }
}
