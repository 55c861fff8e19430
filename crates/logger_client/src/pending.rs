//! PendingAsyncCall - state of one outstanding `log_async`
//!
//! The request, the completion handler and an in-flight slot are bundled and
//! moved into the spawned task. The task keeps them alive independently of
//! the caller's stack and of the client; they are released when the task
//! ends, right after the completion has fired.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use contracts::{LogRequest, LoggerTransport, LoggingError, Result};
use tokio::sync::Notify;
use tracing::warn;

use crate::metrics::CallMetrics;

/// Completion handler of an async call. Invoked exactly once.
pub type Completion = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// Handler used when the caller supplies none: failures become a warning
/// naming the event_source and are otherwise discarded.
pub(crate) fn default_completion(event_source: String) -> Completion {
    Box::new(move |result| {
        if let Err(e) = result {
            warn!(
                event_source = %event_source,
                error = %e,
                "Failed to log item for event source in async call"
            );
        }
    })
}

/// Count of outstanding async calls, with idle notification
///
/// Rejected calls are tracked apart from admitted ones: they never count
/// toward the admission limit, but `wait_idle` still waits for their
/// completion to fire.
#[derive(Debug, Default)]
pub(crate) struct InFlightTracker {
    count: AtomicUsize,
    rejected: AtomicUsize,
    idle: Notify,
}

impl InFlightTracker {
    pub(crate) fn current(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn is_idle(&self) -> bool {
        self.count.load(Ordering::SeqCst) == 0 && self.rejected.load(Ordering::SeqCst) == 0
    }

    /// Reserve a slot, honouring the admission limit
    pub(crate) fn try_acquire(self: &Arc<Self>, limit: Option<usize>) -> Result<InFlightSlot> {
        let mut current = self.count.load(Ordering::SeqCst);
        loop {
            if let Some(limit) = limit {
                if current >= limit {
                    return Err(LoggingError::ResourceExhausted {
                        in_flight: current,
                        limit,
                    });
                }
            }
            match self.count.compare_exchange_weak(
                current,
                current + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    observability::record_async_in_flight(current + 1);
                    return Ok(InFlightSlot {
                        tracker: Arc::clone(self),
                        admitted: true,
                    });
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Hold a rejected call until its completion has fired
    pub(crate) fn hold_rejected(self: &Arc<Self>) -> InFlightSlot {
        self.rejected.fetch_add(1, Ordering::SeqCst);
        InFlightSlot {
            tracker: Arc::clone(self),
            admitted: false,
        }
    }

    /// Resolve once no call, admitted or rejected, is still pending
    pub(crate) async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a release in between is not missed
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

/// One reserved slot; released on drop
#[derive(Debug)]
pub(crate) struct InFlightSlot {
    tracker: Arc<InFlightTracker>,
    admitted: bool,
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        if self.admitted {
            let previous = self.tracker.count.fetch_sub(1, Ordering::SeqCst);
            observability::record_async_in_flight(previous - 1);
        } else {
            self.tracker.rejected.fetch_sub(1, Ordering::SeqCst);
        }
        if self.tracker.is_idle() {
            self.tracker.idle.notify_waiters();
        }
    }
}

/// State of one outstanding async Log call
///
/// Exclusively owned by the task that drives the call. If it is dropped
/// before the transport answered (runtime shutdown, panicking transport) the
/// completion fires with `Cancelled` from `Drop`, so it fires exactly once
/// on every path.
pub(crate) struct PendingAsyncCall {
    event_source: String,
    request: Option<LogRequest>,
    completion: Option<Completion>,
    metrics: Arc<CallMetrics>,
    // Field drops run after `Drop::drop`, so the slot outlives the completion.
    _slot: InFlightSlot,
}

impl PendingAsyncCall {
    pub(crate) fn new(
        request: LogRequest,
        completion: Completion,
        metrics: Arc<CallMetrics>,
        slot: InFlightSlot,
    ) -> Self {
        Self {
            event_source: request.item.event_source.clone(),
            request: Some(request),
            completion: Some(completion),
            metrics,
            _slot: slot,
        }
    }

    /// Issue the RPC, then fire the completion
    pub(crate) async fn run<T: LoggerTransport>(mut self, transport: &T) {
        let Some(request) = self.request.take() else {
            return;
        };

        let started = Instant::now();
        let result = transport.log(request).await;
        observability::record_rpc("Log", &result, started.elapsed());
        self.metrics.record_async(result.is_ok());

        self.complete(result);
    }

    fn complete(mut self, result: Result<()>) {
        if let Some(completion) = self.completion.take() {
            completion(result);
        }
    }
}

impl Drop for PendingAsyncCall {
    fn drop(&mut self) {
        if let Some(completion) = self.completion.take() {
            self.metrics.inc_async_cancelled();
            completion(Err(LoggingError::cancelled(format!(
                "async log call for event source '{}' dropped before completion",
                self.event_source
            ))));
        }
    }
}
