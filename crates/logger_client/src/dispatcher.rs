//! LoggerClient - synchronous and asynchronous dispatch over the transport

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use contracts::{
    ClientConfig, DispatcherConfig, LogItem, LogRequest, LoggerTransport, LoggingError,
    PaginationConfig, Result,
};
use tokio::runtime::Handle;
use tracing::{debug, instrument, warn};

use crate::metrics::{CallMetrics, MetricsSnapshot};
use crate::pending::{default_completion, Completion, InFlightTracker, PendingAsyncCall};

/// Builder for creating a LoggerClient
pub struct LoggerClientBuilder<T> {
    transport: Arc<T>,
    dispatcher: DispatcherConfig,
    pagination: PaginationConfig,
    runtime: Option<Handle>,
}

impl<T> LoggerClientBuilder<T>
where
    T: LoggerTransport + Sync + 'static,
{
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Use a transport that is also shared elsewhere
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self {
            transport,
            dispatcher: DispatcherConfig::default(),
            pagination: PaginationConfig::default(),
            runtime: None,
        }
    }

    /// Take the client-side sections of a loaded config
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.dispatcher = config.dispatcher;
        self.pagination = config.pagination;
        self
    }

    pub fn dispatcher_config(mut self, dispatcher: DispatcherConfig) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn pagination_config(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Runtime on which async calls and their completions run.
    ///
    /// Defaults to the runtime current at `build()`.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// `ConfigValidation` if no runtime was given and none is current, or if
    /// a configured limit is zero.
    pub fn build(self) -> Result<LoggerClient<T>> {
        if self.dispatcher.max_in_flight == Some(0) {
            return Err(LoggingError::config_validation(
                "dispatcher.max_in_flight",
                "max_in_flight must be >= 1",
            ));
        }
        if self.pagination.default_page_size == Some(0) {
            return Err(LoggingError::config_validation(
                "pagination.default_page_size",
                "default_page_size must be >= 1",
            ));
        }

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|e| {
                LoggingError::config_validation(
                    "runtime",
                    format!("no tokio runtime available for async dispatch: {e}"),
                )
            })?,
        };

        Ok(LoggerClient {
            transport: self.transport,
            runtime,
            dispatcher: self.dispatcher,
            pagination: self.pagination,
            in_flight: Arc::new(InFlightTracker::default()),
            metrics: Arc::new(CallMetrics::new()),
        })
    }
}

/// Client for the structured logging service
///
/// Cheap to clone; clones share the transport, the in-flight accounting and
/// the metrics. No internal lock guards the transport: see the concurrency
/// precondition on [`LoggerTransport`].
pub struct LoggerClient<T> {
    pub(crate) transport: Arc<T>,
    runtime: Handle,
    dispatcher: DispatcherConfig,
    pub(crate) pagination: PaginationConfig,
    in_flight: Arc<InFlightTracker>,
    metrics: Arc<CallMetrics>,
}

impl<T> Clone for LoggerClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            runtime: self.runtime.clone(),
            dispatcher: self.dispatcher,
            pagination: self.pagination,
            in_flight: Arc::clone(&self.in_flight),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T> LoggerClient<T>
where
    T: LoggerTransport + Sync + 'static,
{
    pub fn builder(transport: T) -> LoggerClientBuilder<T> {
        LoggerClientBuilder::new(transport)
    }

    /// Client with default settings on the current runtime
    pub fn new(transport: T) -> Result<Self> {
        Self::builder(transport).build()
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Outstanding async calls
    pub fn in_flight(&self) -> usize {
        self.in_flight.current()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.in_flight())
    }

    /// Resolve once every outstanding async call, admitted or rejected, has
    /// fired its completion and released its state
    #[instrument(name = "logger_client_drain", skip(self), fields(in_flight = self.in_flight()))]
    pub async fn drain(&self) {
        self.in_flight.wait_idle().await;
        debug!("All async calls drained");
    }

    /// Dispatch one log item and wait for the server's acknowledgement.
    ///
    /// Exactly one RPC; errors are returned verbatim, no retry.
    #[instrument(
        name = "logger_client_log",
        skip(self, item),
        fields(event_source = %item.event_source)
    )]
    pub async fn log(&self, item: LogItem) -> Result<()> {
        let request = LogRequest { item };
        self.call("Log", self.transport.log(request)).await
    }

    /// Dispatch one log item without waiting.
    ///
    /// Failures are reported as a warning naming the event_source and then
    /// discarded. Use [`log_async_with`](Self::log_async_with) to observe
    /// them.
    pub fn log_async(&self, item: LogItem) {
        let completion = default_completion(item.event_source.clone());
        self.dispatch_async(item, completion);
    }

    /// Dispatch one log item without waiting; `completion` fires exactly
    /// once, on the runtime, never on the caller's stack.
    pub fn log_async_with<F>(&self, item: LogItem, completion: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        self.dispatch_async(item, Box::new(completion));
    }

    fn dispatch_async(&self, item: LogItem, completion: Completion) {
        self.metrics.inc_async_started();

        let slot = match self.in_flight.try_acquire(self.dispatcher.max_in_flight) {
            Ok(slot) => slot,
            Err(e) => {
                self.metrics.inc_async_rejected();
                observability::record_async_rejected();
                warn!(
                    event_source = %item.event_source,
                    error = %e,
                    "Async log call rejected"
                );
                let held = self.in_flight.hold_rejected();
                self.runtime.spawn(async move {
                    completion(Err(e));
                    drop(held);
                });
                return;
            }
        };

        let call = PendingAsyncCall::new(
            LogRequest { item },
            completion,
            Arc::clone(&self.metrics),
            slot,
        );
        let transport = Arc::clone(&self.transport);
        self.runtime.spawn(async move {
            call.run(transport.as_ref()).await;
        });
    }

    /// Distinct event_source identifiers known to the service right now
    #[instrument(name = "logger_client_list_log_sources", skip(self))]
    pub async fn list_log_sources(&self) -> Result<Vec<String>> {
        self.call("ListLogSources", self.transport.list_log_sources())
            .await
    }

    /// Most recent item logged for `event_source`, from the server's cache.
    ///
    /// # Errors
    /// `NotFound` if nothing was logged for it within the retention window.
    #[instrument(name = "logger_client_get_most_recent_item", skip(self))]
    pub async fn get_most_recent_item(&self, event_source: &str) -> Result<LogItem> {
        self.call(
            "GetMostRecentItem",
            self.transport.get_most_recent_item(event_source),
        )
        .await
    }

    /// Await one synchronous RPC and account for it
    pub(crate) async fn call<R, F>(&self, method: &'static str, rpc: F) -> Result<R>
    where
        F: Future<Output = Result<R>>,
    {
        let started = Instant::now();
        let result = rpc.await;
        observability::record_rpc(method, &result, started.elapsed());
        self.metrics.record_sync(result.is_ok());
        if let Err(e) = &result {
            debug!(method, code = %e.code(), error = %e, "RPC failed");
        }
        result
    }
}
