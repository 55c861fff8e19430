//! LoggerTransport trait - the injected connection capability
//!
//! Abstracts the logging service RPC surface so the client never hard-wires a
//! concrete channel type. Real transports (gRPC, HTTP, ...) and test doubles
//! implement the same trait.

use crate::{
    GetLogItemsRequest, GetLogItemsResponse, LogItem, LogOptions, LogRequest, Result,
    SetLogOptionsRequest, SyncRequest, SyncResponse,
};

/// Logging service transport
///
/// # Concurrency precondition
///
/// Implementations must accept an unlimited number of concurrently
/// outstanding calls through `&self` without external locking. The client
/// shares a single instance across every synchronous call and every spawned
/// async call and never serializes access to it.
///
/// Deadlines and cancellation are properties of the transport, fixed at
/// construction; the client does not set them per call.
///
/// Errors are returned verbatim to synchronous callers; the client performs
/// no retry.
#[trait_variant::make(LoggerTransport: Send)]
pub trait LocalLoggerTransport {
    /// Store one item. Empty ack on success.
    async fn log(&self, request: LogRequest) -> Result<()>;

    /// Distinct event_source identifiers known at call time
    async fn list_log_sources(&self) -> Result<Vec<String>>;

    /// One page of items for the given sources and window
    async fn get_log_items(&self, request: GetLogItemsRequest) -> Result<GetLogItemsResponse>;

    /// Most recent cached item for a source
    ///
    /// # Errors
    /// `NotFound` if nothing was logged within the retention window
    async fn get_most_recent_item(&self, event_source: &str) -> Result<LogItem>;

    /// Flush and rotate storage for the requested sources
    async fn sync_and_rotate_logs(&self, request: SyncRequest) -> Result<SyncResponse>;

    async fn set_log_options(&self, request: SetLogOptionsRequest) -> Result<()>;

    /// # Errors
    /// `NotFound` if no options were ever set for the source
    async fn get_log_options(&self, event_source: &str) -> Result<LogOptions>;
}
